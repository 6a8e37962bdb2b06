use anyhow::bail;
use cmdfns::command;

/// Adds two integers.
#[command]
fn add(a: i64, b: i64) -> i64 {
    a + b
}

/// Divides two numbers.
#[command]
fn divide(dividend: f64, divisor: f64) -> anyhow::Result<f64> {
    if divisor == 0.0 {
        bail!("cannot divide {} by zero", dividend);
    }
    Ok(dividend / divisor)
}

/// Repeats a word, optionally shouting it.
#[command]
fn repeat(word: String, #[arg(default = 2)] times: usize, #[arg(default = false)] loud: bool) -> String {
    let word = if loud { word.to_uppercase() } else { word };
    vec![word; times].join(" ")
}

/// Prints summary statistics as JSON.
#[command]
fn stats(numbers: Vec<f64>) -> serde_json::Value {
    let count = numbers.len();
    let sum: f64 = numbers.iter().sum();
    let mean = if count == 0 { None } else { Some(sum / count as f64) };
    serde_json::json!({ "count": count, "sum": sum, "mean": mean })
}
