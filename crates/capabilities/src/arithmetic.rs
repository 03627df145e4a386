//! Arithmetic capability provider.
//!
//! Seven operations over JSON number arguments: multiply, add, subtract,
//! divide, power, sqrt, percentage. Subtract and divide apply sequentially
//! from the first operand. Results are returned as a single text content
//! part, the shape the agent loop's result formatter expects.

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use toolstream_core::capability::{Capability, CapabilityProvider, ProviderState};
use toolstream_core::error::CapabilityError;

/// The arithmetic operation a capability instance performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Multiply,
    Add,
    Subtract,
    Divide,
    Power,
    Sqrt,
    Percentage,
}

/// One arithmetic capability.
pub struct ArithmeticCapability {
    op: Op,
}

impl ArithmeticCapability {
    fn compute(&self, arguments: &serde_json::Value) -> Result<f64, CapabilityError> {
        match self.op {
            Op::Multiply => Ok(numbers(arguments)?.into_iter().product()),
            Op::Add => Ok(numbers(arguments)?.into_iter().sum()),
            Op::Subtract => {
                let nums = numbers(arguments)?;
                Ok(nums[1..].iter().fold(nums[0], |acc, n| acc - n))
            }
            Op::Divide => {
                let nums = numbers(arguments)?;
                nums[1..].iter().try_fold(nums[0], |acc, n| {
                    if *n == 0.0 {
                        Err(CapabilityError::InvalidArguments(
                            "Division by zero".into(),
                        ))
                    } else {
                        Ok(acc / n)
                    }
                })
            }
            Op::Power => {
                let base = number_field(arguments, "base")?;
                let exponent = number_field(arguments, "exponent")?;
                Ok(base.powf(exponent))
            }
            Op::Sqrt => {
                let number = number_field(arguments, "number")?;
                if number < 0.0 {
                    return Err(CapabilityError::InvalidArguments(
                        "Cannot take square root of a negative number".into(),
                    ));
                }
                Ok(number.sqrt())
            }
            Op::Percentage => {
                let part = number_field(arguments, "part")?;
                let whole = number_field(arguments, "whole")?;
                if whole == 0.0 {
                    return Err(CapabilityError::InvalidArguments(
                        "Cannot compute a percentage of zero".into(),
                    ));
                }
                Ok(part / whole * 100.0)
            }
        }
    }
}

/// Extract a non-empty `numbers` array argument.
fn numbers(arguments: &serde_json::Value) -> Result<Vec<f64>, CapabilityError> {
    let array = arguments["numbers"].as_array().ok_or_else(|| {
        CapabilityError::InvalidArguments("Missing 'numbers' array argument".into())
    })?;
    if array.is_empty() {
        return Err(CapabilityError::InvalidArguments(
            "'numbers' must not be empty".into(),
        ));
    }
    array
        .iter()
        .map(|v| {
            v.as_f64().ok_or_else(|| {
                CapabilityError::InvalidArguments(format!("'{v}' is not a number"))
            })
        })
        .collect()
}

/// Extract a required numeric field.
fn number_field(arguments: &serde_json::Value, key: &str) -> Result<f64, CapabilityError> {
    arguments[key].as_f64().ok_or_else(|| {
        CapabilityError::InvalidArguments(format!("Missing '{key}' number argument"))
    })
}

/// Format a computed value: integers without the trailing `.0`.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn numbers_schema(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "numbers": {
                "type": "array",
                "items": { "type": "number" },
                "description": description
            }
        },
        "required": ["numbers"]
    })
}

#[async_trait]
impl Capability for ArithmeticCapability {
    fn name(&self) -> &str {
        match self.op {
            Op::Multiply => "multiply",
            Op::Add => "add",
            Op::Subtract => "subtract",
            Op::Divide => "divide",
            Op::Power => "power",
            Op::Sqrt => "sqrt",
            Op::Percentage => "percentage",
        }
    }

    fn description(&self) -> &str {
        match self.op {
            Op::Multiply => {
                "Multiplies an array of numbers together. Returns the product of all numbers."
            }
            Op::Add => "Adds an array of numbers together. Returns the sum of all numbers.",
            Op::Subtract => {
                "Subtracts numbers sequentially. Subtracts all subsequent numbers from the first number."
            }
            Op::Divide => {
                "Divides numbers sequentially. Divides the first number by all subsequent numbers."
            }
            Op::Power => "Raises a number to a power. Calculates base^exponent.",
            Op::Sqrt => "Calculates the square root of a number.",
            Op::Percentage => {
                "Calculates what percentage one number is of another. Returns (part/whole) * 100."
            }
        }
    }

    fn input_schema(&self) -> serde_json::Value {
        match self.op {
            Op::Multiply => numbers_schema("Array of numbers to multiply"),
            Op::Add => numbers_schema("Array of numbers to add"),
            Op::Subtract => {
                numbers_schema("Array of numbers to subtract (first - second - third - ...)")
            }
            Op::Divide => {
                numbers_schema("Array of numbers to divide (first / second / third / ...)")
            }
            Op::Power => serde_json::json!({
                "type": "object",
                "properties": {
                    "base": { "type": "number", "description": "The base number" },
                    "exponent": { "type": "number", "description": "The exponent" }
                },
                "required": ["base", "exponent"]
            }),
            Op::Sqrt => serde_json::json!({
                "type": "object",
                "properties": {
                    "number": {
                        "type": "number",
                        "description": "The number to calculate square root of"
                    }
                },
                "required": ["number"]
            }),
            Op::Percentage => serde_json::json!({
                "type": "object",
                "properties": {
                    "part": { "type": "number", "description": "The part value" },
                    "whole": { "type": "number", "description": "The whole value" }
                },
                "required": ["part", "whole"]
            }),
        }
    }

    async fn invoke(
        &self,
        arguments: serde_json::Value,
        _cancel: CancellationToken,
    ) -> Result<serde_json::Value, CapabilityError> {
        let value = self.compute(&arguments)?;
        debug!(capability = self.name(), value, "Arithmetic capability computed");
        Ok(serde_json::json!({
            "content": [{ "type": "text", "text": format_value(value) }]
        }))
    }
}

/// Provider grouping the arithmetic capabilities. In-process, so it is
/// always ready.
pub struct ArithmeticProvider;

#[async_trait]
impl CapabilityProvider for ArithmeticProvider {
    fn id(&self) -> &str {
        "arithmetic"
    }

    fn capabilities(&self) -> Vec<Arc<dyn Capability>> {
        [
            Op::Multiply,
            Op::Add,
            Op::Subtract,
            Op::Divide,
            Op::Power,
            Op::Sqrt,
            Op::Percentage,
        ]
        .into_iter()
        .map(|op| Arc::new(ArithmeticCapability { op }) as Arc<dyn Capability>)
        .collect()
    }

    async fn ensure_ready(&self) -> Result<ProviderState, CapabilityError> {
        Ok(ProviderState::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn invoke(name: &str, arguments: serde_json::Value) -> Result<String, CapabilityError> {
        let capability = ArithmeticProvider
            .capabilities()
            .into_iter()
            .find(|c| c.name() == name)
            .expect("capability registered");
        let value = capability
            .invoke(arguments, CancellationToken::new())
            .await?;
        Ok(value["content"][0]["text"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn multiply_returns_product() {
        let text = invoke("multiply", serde_json::json!({"numbers": [2, 3, 4]}))
            .await
            .unwrap();
        assert_eq!(text, "24");
    }

    #[tokio::test]
    async fn multiply_decimals() {
        let text = invoke("multiply", serde_json::json!({"numbers": [2.5, 4]}))
            .await
            .unwrap();
        assert_eq!(text, "10");
    }

    #[tokio::test]
    async fn add_returns_sum() {
        let text = invoke("add", serde_json::json!({"numbers": [1.5, 2.5, 3]}))
            .await
            .unwrap();
        assert_eq!(text, "7");
    }

    #[tokio::test]
    async fn subtract_is_sequential() {
        let text = invoke("subtract", serde_json::json!({"numbers": [10, 3, 2]}))
            .await
            .unwrap();
        assert_eq!(text, "5");
    }

    #[tokio::test]
    async fn divide_is_sequential() {
        let text = invoke("divide", serde_json::json!({"numbers": [100, 5, 2]}))
            .await
            .unwrap();
        assert_eq!(text, "10");
    }

    #[tokio::test]
    async fn divide_by_zero_errors() {
        let err = invoke("divide", serde_json::json!({"numbers": [1, 0]}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Division by zero"));
    }

    #[tokio::test]
    async fn power_raises() {
        let text = invoke("power", serde_json::json!({"base": 2, "exponent": 10}))
            .await
            .unwrap();
        assert_eq!(text, "1024");
    }

    #[tokio::test]
    async fn sqrt_of_negative_errors() {
        let err = invoke("sqrt", serde_json::json!({"number": -4}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("negative"));
    }

    #[tokio::test]
    async fn percentage_computes() {
        let text = invoke("percentage", serde_json::json!({"part": 25, "whole": 200}))
            .await
            .unwrap();
        assert_eq!(text, "12.5");
    }

    #[tokio::test]
    async fn empty_numbers_rejected() {
        let err = invoke("multiply", serde_json::json!({"numbers": []}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[tokio::test]
    async fn missing_numbers_rejected() {
        let err = invoke("add", serde_json::json!({})).await.unwrap_err();
        assert!(err.to_string().contains("numbers"));
    }

    #[test]
    fn provider_advertises_all_operations() {
        let names: Vec<String> = ArithmeticProvider
            .capabilities()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["multiply", "add", "subtract", "divide", "power", "sqrt", "percentage"]
        );
    }

    #[test]
    fn format_trims_integer_fraction() {
        assert_eq!(format_value(5.0), "5");
        assert_eq!(format_value(2.5), "2.5");
        assert_eq!(format_value(-3.0), "-3");
    }
}
