//! Slate is a small dynamically typed scripting language with lexical
//! scoping and first-class functions, implemented as a tree-walk
//! interpreter with a hand-written recursive descent parser.
//!
//! Running a program is a pipeline of four stages. Each stage reports its
//! own class of errors and a failed stage stops the pipeline, so later
//! stages can assume well-formed input.
//!
//! ## Scanning
//! The [`scanner`](scanner) turns the source text into a flat list of
//! [`Token`](token::Token)s, ending with a single EOF token. It reports
//! trivial problems like an unterminated string or a stray character as a
//! [`ScanError`](error::ScanError) and keeps going, so a single run surfaces
//! every lexical problem in the file.
//!
//! ## Parsing
//! The [`parser`](parser) turns the token list into a syntax tree of
//! [`Expr`](expr::Expr)essions and [`Stmt`](stmt::Stmt)ements. On a syntax
//! error it reports a [`ParseError`](error::ParseError) and synchronizes to
//! the next statement boundary, again so that one run reports as much as
//! possible. `for` loops are desugared here into `while` loops wrapped in
//! blocks; the later stages never see them.
//!
//! ## Resolving
//! The [`resolver`](resolver) is a static pass over the finished tree that
//! records how many scopes sit between every local variable use and its
//! declaration. The interpreter later walks exactly that far up the
//! environment chain, which is what keeps closures honest: a function body
//! sees the bindings that existed where it was defined, not whatever
//! happens to shadow them at call time. The pass also catches the static
//! mistakes that are invisible to the parser, a variable read in its own
//! initializer, a duplicate declaration in the same local scope, or a
//! `return` outside any function, and reports them as a
//! [`ResolveError`](error::ResolveError).
//!
//! ## Interpreting
//! The [`interpreter`](interpreter) walks the tree and executes it against
//! a chain of [`Environment`](environment::Environment)s, one frame per
//! active block or call. Most type mistakes can only be caught here and are
//! reported as a [`RuntimeError`](error::RuntimeError), which unwinds to
//! the top of the interpret loop and stops the program.

use std::fs;
use std::io::Write;
use std::process;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub mod ast;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

#[allow(non_camel_case_types)]
pub struct slate<'a> {
    interpreter: interpreter::Interpreter<'a>,
}

impl<'a> slate<'a> {
    /// Creates a new interpreter session writing `print` output to `output`.
    pub fn new(output: &'a mut dyn Write) -> Self {
        slate {
            interpreter: interpreter::Interpreter::new(output),
        }
    }

    /// Runs a script file. Exits with 65 after a compile-time error and
    /// with 70 after a runtime error.
    pub fn run_file(&mut self, path: String) {
        let contents = fs::read_to_string(path)
            .expect("should have been able to read the file");

        self.run(&contents);

        if error::did_error() {
            process::exit(65);
        }
        if error::did_runtime_error() {
            process::exit(70);
        }
    }

    /// Runs an interactive prompt. Globals persist from line to line and
    /// the error flags are cleared after every line, so one bad line does
    /// not poison the next.
    pub fn run_prompt(&mut self) {
        let mut editor = DefaultEditor::new().expect("line editor to initialize");

        let history = home::home_dir().map(|dir| dir.join(".slate_history"));
        if let Some(history) = &history {
            let _ = editor.load_history(history);
        }

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(&line);
                    self.run(&line);
                    error::reset_error();
                },
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(error) => {
                    eprintln!("failed to read line: {error}");
                    break;
                },
            }
        }

        if let Some(history) = &history {
            let _ = editor.save_history(history);
        }
    }

    fn run(&mut self, source: &str) {
        let tokens = Scanner::new(source).scan_tokens();

        if error::did_error() {
            return;
        }

        let mut parser = Parser::new(tokens);
        let statements = parser.parse();

        if error::did_error() {
            return;
        }

        let mut resolver = Resolver::new(&mut self.interpreter);
        resolver.resolve(&statements);

        if error::did_error() {
            return;
        }

        self.interpreter.interpret(&statements);
    }
}
