#[macro_use]
mod common;

#[cfg(test)]
mod string {
    tests! {
        concat in string is OK
        "abcd"
    }

    tests! {
        multiline in string is OK
        "1"
        "2"
        "3"
    }

    tests! {
        unterminated in string is ERR
        "[line 1] Error: Unterminated string."
    }

    tests! {
        error_after_multiline in string is ERR
        "Operands must be two numbers or two strings."
        " [line 3]"
    }
}
