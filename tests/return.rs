#[macro_use]
mod common;

#[cfg(test)]
mod r#return {
    tests! {
        after_if in return is OK
        "yes"
        "no"
    }

    tests! {
        in_nested_block in return is OK
        "deep"
    }

    tests! {
        without_value in return is OK
        "nil"
    }

    tests! {
        at_top_level in return is ERR
        "[line 1] Error at 'return': Can't return from top-level code."
    }
}
