//! Local functions exposed to the assistant.

use chrono::Local;
use doctools::tool;

#[tool]
/// Return the current date in the format Weekday - YYYY-MM-DD
async fn get_date() -> String {
    Local::now().format("%A %Y-%m-%d").to_string()
}

#[tool]
/// Return the current time in the format HH:MM
async fn get_time() -> String {
    Local::now().format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use doctools::{collect_tools, FunctionCall};
    use serde_json::json;

    #[tokio::test]
    async fn test_time_and_date_tools() {
        let tools = collect_tools().unwrap();

        let time = tools
            .call(FunctionCall::new("get_time", json!({})))
            .await
            .unwrap()
            .output;
        assert_eq!(time.len(), 5);
        assert_eq!(&time[2..3], ":");

        let date = tools
            .call(FunctionCall::new("get_date", json!(null)))
            .await
            .unwrap()
            .output;
        let (weekday, ymd) = date.split_once(' ').unwrap();
        assert!(weekday.ends_with("day"));
        assert_eq!(ymd.len(), 10);
    }

    #[test]
    fn test_zero_parameter_schemas() {
        let tools = collect_tools().unwrap();
        for name in ["get_date", "get_time"] {
            let schema = serde_json::to_value(tools.schema(name).unwrap()).unwrap();
            assert_eq!(schema["parameters"], json!({}));
        }
    }
}
