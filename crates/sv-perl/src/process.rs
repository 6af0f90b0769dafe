//! Process-level fragments of the emitted script.

/// `exit(<code>);`
pub fn exit(code: i32) -> String {
    format!("exit({code});\n")
}

/// The process argument vector, boxed into a stdlib array.
pub fn argv() -> String {
    "stdlib::array->new(@ARGV)".to_string()
}
