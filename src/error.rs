use std::sync::atomic::{AtomicBool, Ordering};

use crate::object::Object;
use crate::token::{Token, Type};

static HAD_ERROR: AtomicBool = AtomicBool::new(false);
static HAD_RUNTIME_ERROR: AtomicBool = AtomicBool::new(false);

/// Checks if an error occurred during scanning, parsing or resolving.
pub fn did_error() -> bool {
    HAD_ERROR.load(Ordering::Relaxed)
}

/// Checks if an error occurred during runtime.
pub fn did_runtime_error() -> bool {
    HAD_RUNTIME_ERROR.load(Ordering::Relaxed)
}

/// Resets both error flags.
/// This is used to reset the interpreter after an error occurs when running prompts.
pub fn reset_error() {
    HAD_ERROR.store(false, Ordering::Relaxed);
    HAD_RUNTIME_ERROR.store(false, Ordering::Relaxed);
}

/// Every error type must implement this trait.
pub trait Error {
    /// Prints the error message and sets the error flag.
    fn throw(&self);
}

/// Represents an error that occurs during scanning.
#[derive(Debug)]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

impl Error for ScanError {
    fn throw(&self) {
        eprintln!("[line {line}] Error: {message}", line = self.line, message = self.message);
        HAD_ERROR.store(true, Ordering::Relaxed);
    }
}

/// Represents an error that occurs during parsing.
#[derive(Debug)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl Error for ParseError {
    fn throw(&self) {
        report(&self.token, &self.message);
    }
}

/// Represents an error that occurs during resolution.
#[derive(Debug)]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

impl Error for ResolveError {
    fn throw(&self) {
        report(&self.token, &self.message);
    }
}

fn report(token: &Token, message: &str) {
    if token.r#type == Type::EOF {
        eprintln!("[line {line}] Error at end: {message}", line = token.line);
    } else {
        eprintln!(
            "[line {line}] Error at '{lexeme}': {message}",
            line = token.line,
            lexeme = token.lexeme,
        );
    }

    HAD_ERROR.store(true, Ordering::Relaxed);
}

/// Represents an error that occurs during runtime.
/// It is propagated up the execution stack and thrown by the interpret loop.
#[derive(Debug)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl Error for RuntimeError {
    fn throw(&self) {
        eprintln!("{message}\n [line {line}]", message = self.message, line = self.token.line);
        HAD_RUNTIME_ERROR.store(true, Ordering::Relaxed);
    }
}

/// Non-local control flow raised during execution.
///
/// A `return` statement unwinds with `Unwind::Return` and is caught exactly
/// by the function call machinery; runtime errors unwind all the way back to
/// the interpret loop.
#[derive(Debug)]
pub enum Unwind {
    Error(RuntimeError),
    Return(Object),
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Error(error)
    }
}
