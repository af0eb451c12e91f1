#[macro_use]
mod common;

#[cfg(test)]
mod variable {
    tests! {
        shadow_block in variable is OK
        "2"
        "1"
    }

    tests! {
        redeclare_global in variable is OK
        "second"
    }

    tests! {
        uninitialized in variable is OK
        "nil"
    }

    tests! {
        assign_returns_value in variable is OK
        "2"
        "2"
    }

    tests! {
        chained_assignment in variable is OK
        "3"
        "3"
    }

    tests! {
        undefined_global in variable is ERR
        "Undefined variable 'missing'."
        " [line 1]"
    }

    tests! {
        assign_undefined in variable is ERR
        "Undefined variable 'missing'."
        " [line 1]"
    }

    tests! {
        use_in_own_initializer in variable is ERR
        "[line 2] Error at 'a': Can't read local variable in its own initializer."
    }

    tests! {
        duplicate_local in variable is ERR
        "[line 3] Error at 'x': Already a variable with this name in this scope."
    }
}
