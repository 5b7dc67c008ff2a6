//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use crate::error::CliError;

/// Query a media server through the Marquee request coordinator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short = 'c', long = "config", env = "MARQUEE_CONFIG", value_name = "FILE")]
    pub config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long = "json-logs")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch once and print the result
    Fetch(CallArgs),
    /// Keep fetching on reconnect and print every new result
    Watch(CallArgs),
    /// List the built-in endpoints and their methods
    Endpoints,
}

#[derive(Args, Debug, Clone)]
pub struct CallArgs {
    /// Endpoint name, e.g. `items`
    pub endpoint: String,

    /// Method name, e.g. `getItems`
    pub method: String,

    /// Parameter object as JSON
    #[arg(short = 'p', long = "params", value_name = "JSON")]
    pub params: Option<String>,

    /// Request body as JSON, for POST and PUT methods
    #[arg(short = 'b', long = "body", value_name = "JSON")]
    pub body: Option<String>,

    /// Treat the response as media items and route them through the item cache
    #[arg(long = "items")]
    pub items: bool,

    /// Do not store the result in the request cache
    #[arg(long = "skip-cache")]
    pub skip_cache: bool,
}

impl CallArgs {
    /// Argument list for the call: the parameter object, then the body.
    pub fn request_args(&self) -> Result<Vec<Value>, CliError> {
        let mut args = Vec::new();
        let params = self.params.as_deref().map(|p| parse_json("--params", p)).transpose()?;
        let body = self.body.as_deref().map(|b| parse_json("--body", b)).transpose()?;
        match (params, body) {
            (Some(params), Some(body)) => {
                args.push(params);
                args.push(body);
            }
            (Some(params), None) => args.push(params),
            (None, Some(body)) => {
                args.push(Value::Object(Default::default()));
                args.push(body);
            }
            (None, None) => {}
        }
        Ok(args)
    }
}

fn parse_json(arg: &'static str, raw: &str) -> Result<Value, CliError> {
    serde_json::from_str(raw).map_err(|source| CliError::InvalidJson { arg, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(params: Option<&str>, body: Option<&str>) -> CallArgs {
        CallArgs {
            endpoint: "items".to_string(),
            method: "getItems".to_string(),
            params: params.map(str::to_string),
            body: body.map(str::to_string),
            items: false,
            skip_cache: false,
        }
    }

    #[test]
    fn test_body_without_params_gets_empty_params() {
        let args = call(None, Some(r#"{"a":1}"#)).request_args().expect("valid");
        assert_eq!(args, vec![json!({}), json!({"a": 1})]);
    }

    #[test]
    fn test_invalid_json_names_the_flag() {
        let err = call(Some("{nope"), None).request_args().unwrap_err();
        assert!(err.to_string().contains("--params"));
    }

    #[test]
    fn test_parses_subcommand() {
        let cli = Cli::try_parse_from([
            "marquee",
            "--config",
            "marquee.toml",
            "fetch",
            "items",
            "getItems",
            "--params",
            r#"{"parentId":"x"}"#,
            "--items",
        ])
        .expect("parses");
        match cli.command {
            Command::Fetch(args) => {
                assert_eq!(args.endpoint, "items");
                assert!(args.items);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
