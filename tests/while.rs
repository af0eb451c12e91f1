#[macro_use]
mod common;

#[cfg(test)]
mod r#while {
    tests! {
        countdown in while is OK
        "3"
        "2"
        "1"
    }

    tests! {
        return_inside in while is OK
        "7"
    }
}
