use doctools::{collect_tools, function_declarations, registry, tool, FunctionCall, ToolError};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tool]
/// Return the weather forecast for the next days at a location.
/// :param lat: float: The latitude of the location
/// :param lon: float: The longitude of the location
/// :param days: int: How many days to cover
///     Default: 7
async fn forecast_summary(lat: f64, lon: f64, days: u32) -> String {
    format!("{days} days at {lat},{lon}")
}

#[tool]
/// Convert a temperature between units
/// :param value: float: Temperature to convert
/// :param to: str: Target unit
///     Must be one of: "celsius", "fahrenheit"
fn convert_temperature(value: f64, to: String) -> Result<f64, String> {
    match to.as_str() {
        "celsius" => Ok((value - 32.0) * 5.0 / 9.0),
        "fahrenheit" => Ok(value * 9.0 / 5.0 + 32.0),
        other => Err(format!("unknown unit {other}")),
    }
}

#[tool]
/// Return a greeting, optionally addressed to someone
/// :param name: str: Who to greet
async fn greet(name: Option<String>) -> String {
    match name {
        Some(name) => format!("Hello, {name}!"),
        None => "Hello!".to_owned(),
    }
}

#[tool]
/// Do nothing at all
async fn noop() {}

#[test]
fn test_registered_tools_are_sorted_by_name() {
    let tools = collect_tools().unwrap();
    let names: Vec<_> = tools.names().collect();
    assert_eq!(
        names,
        ["convert_temperature", "forecast_summary", "greet", "noop"]
    );
}

#[test]
fn test_schema_from_doc_comment() {
    let tools = registry().unwrap();
    let schema = serde_json::to_value(tools.schema("forecast_summary").unwrap()).unwrap();
    assert_eq!(
        schema,
        json!({
            "name": "forecast_summary",
            "description": "Return the weather forecast for the next days at a location.",
            "parameters": {
                "type": "object",
                "properties": {
                    "lat": {"type": "number", "description": "The latitude of the location"},
                    "lon": {"type": "number", "description": "The longitude of the location"},
                    "days": {"type": "integer", "description": "How many days to cover", "default": "7"}
                },
                "required": ["lat", "lon"]
            }
        })
    );

    let convert = tools.schema("convert_temperature").unwrap();
    assert_eq!(
        convert.parameters.property("to").unwrap().enum_values,
        Some(vec!["celsius".to_owned(), "fahrenheit".to_owned()])
    );
    assert!(tools.schema("noop").unwrap().parameters.is_empty());
}

#[test]
fn test_function_declarations_are_wrapped() {
    let decls = function_declarations().unwrap();
    let decls = decls.as_array().unwrap();
    assert_eq!(decls.len(), 4);
    assert!(decls.iter().all(|d| d["type"] == "function"));
    assert_eq!(decls[3]["function"], json!({
        "name": "noop",
        "description": "Do nothing at all",
        "parameters": {}
    }));
}

#[tokio::test]
async fn test_calls_through_registry() {
    let tools = registry().unwrap();

    let out = tools
        .call(FunctionCall::new("forecast_summary", json!({"lat": 1.5, "lon": 2.0})))
        .await
        .unwrap();
    assert_eq!(out.output, "7 days at 1.5,2");

    let out = tools
        .call(
            FunctionCall::from_encoded(
                Some("call_abc".into()),
                "convert_temperature",
                r#"{"value": 100, "to": "celsius"}"#,
            )
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(out.tool_call_id.as_str(), "call_abc");
    assert!(out.output.starts_with("37.77"));

    let err = tools
        .call(FunctionCall::new(
            "convert_temperature",
            json!({"value": 1, "to": "kelvin"}),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Runtime(msg) if msg == "unknown unit kelvin"));

    let out = tools.call(FunctionCall::new("greet", json!({}))).await.unwrap();
    assert_eq!(out.output, "Hello!");

    let out = doctools::call_tool(FunctionCall::new("noop", json!(null)))
        .await
        .unwrap();
    assert_eq!(out.output, "");
}
