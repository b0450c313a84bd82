use kmcheck_core::error::KmError;
use serde::Serialize;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), KmError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
