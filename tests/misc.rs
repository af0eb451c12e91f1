#[macro_use]
mod common;

#[cfg(test)]
mod misc {
    tests! {
        bare_semicolon in misc is OK
    }

    tests! {
        clock in misc is OK
        "true"
        "true"
    }

    tests! {
        unexpected_character in misc is ERR
        "[line 1] Error: Unexpected character."
    }

    tests! {
        missing_semicolon_at_end in misc is ERR
        "[line 1] Error at end: Expect ';' after value."
    }

    tests! {
        multiple_errors in misc is ERR
        "[line 1] Error at '1': Expect variable name."
        "[line 3] Error at '2': Expect variable name."
    }
}
