use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use command_api::{
    CommandCreateDto, CommandId, CommandReadDto, CommandUpdateDto,
    cli_utils::{self, OutputFormat},
    http_utils::{self, CommandApiClient},
};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Options {
    #[arrrg(optional, "Base URL of the command API server")]
    base_url: String,
    #[arrrg(optional, "Output format for get/list commands: json or yaml (default: json)")]
    output: OutputFormat,
}

const USAGE: &str = r#"Usage: cmdctl [options] <command> [args...]

Options:
  --base-url <url>     Base URL of the command API server (default: http://localhost:8080)
  --output <format>    Output format for get/list commands: json or yaml (default: json)

Commands:
  list                                             List all commands
  get <id>                                         Get a command by ID
  create <how-to> <platform> <command-line>        Create a command
  update <id> <how-to> <platform> <command-line>   Replace a command
  patch <id> <json-patch>                          Apply a JSON Patch document
  delete <id>                                      Delete a command

Example:
  cmdctl patch 3 '[{"op":"replace","path":"/platform","value":"Linux"}]'"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (options, free) = Options::from_command_line_relaxed("USAGE: cmdctl <command> [args...]");

    if free.is_empty() {
        cli_utils::exit_with_usage_error("No command specified", USAGE);
    }

    let base_url = if options.base_url.is_empty() {
        "http://localhost:8080".to_string()
    } else {
        options.base_url
    };
    let client = CommandApiClient::new(base_url);
    let output = options.output;

    let args = &free[1..];
    match free[0].as_str() {
        "list" => {
            expect_args(args, 0, "list");
            let commands = http_utils::execute_or_exit(
                || client.get::<Vec<CommandReadDto>>("commands"),
                "Failed to list commands",
            )
            .await;
            cli_utils::print_formatted_or_exit(&commands, output, "commands");
        }
        "get" => {
            expect_args(args, 1, "get <id>");
            let id = parse_id(&args[0]);
            let path = format!("commands/{}", id);
            let command = http_utils::execute_or_exit(
                || client.get::<CommandReadDto>(&path),
                "Failed to get command",
            )
            .await;
            cli_utils::print_formatted_or_exit(&command, output, "command");
        }
        "create" => {
            expect_args(args, 3, "create <how-to> <platform> <command-line>");
            let request = CommandCreateDto {
                how_to: args[0].clone(),
                platform: args[1].clone(),
                command_line: args[2].clone(),
            };
            let created = http_utils::execute_or_exit(
                || client.post::<CommandCreateDto, CommandReadDto>("commands", &request),
                "Failed to create command",
            )
            .await;
            cli_utils::print_formatted_or_exit(&created, output, "command");
        }
        "update" => {
            expect_args(args, 4, "update <id> <how-to> <platform> <command-line>");
            let id = parse_id(&args[0]);
            let path = format!("commands/{}", id);
            let request = CommandUpdateDto {
                how_to: args[1].clone(),
                platform: args[2].clone(),
                command_line: args[3].clone(),
            };
            http_utils::execute_or_exit(
                || client.put(&path, &request),
                "Failed to update command",
            )
            .await;
            cli_utils::print_success(&format!("Updated command {}", id));
        }
        "patch" => {
            expect_args(args, 2, "patch <id> <json-patch>");
            let id = parse_id(&args[0]);
            let path = format!("commands/{}", id);
            let patch: serde_json::Value = serde_json::from_str(&args[1]).unwrap_or_else(|e| {
                cli_utils::exit_with_error(&format!("Invalid JSON Patch document: {}", e))
            });
            http_utils::execute_or_exit(
                || client.patch_json(&path, &patch),
                "Failed to patch command",
            )
            .await;
            cli_utils::print_success(&format!("Patched command {}", id));
        }
        "delete" => {
            expect_args(args, 1, "delete <id>");
            let id = parse_id(&args[0]);
            let path = format!("commands/{}", id);
            let status = http_utils::execute_or_exit(
                || client.delete(&path),
                "Failed to delete command",
            )
            .await;
            if status == reqwest::StatusCode::NO_CONTENT {
                cli_utils::print_success(&format!("Deleted command {}", id));
            } else {
                cli_utils::print_success(&format!("No command {} to delete", id));
            }
        }
        other => {
            cli_utils::exit_with_usage_error(&format!("Unknown command '{}'", other), USAGE);
        }
    }

    Ok(())
}

fn expect_args(args: &[String], count: usize, usage: &str) {
    if args.len() != count {
        cli_utils::exit_with_error(&format!(
            "expected {} argument(s)\nUsage: cmdctl {}",
            count, usage
        ));
    }
}

fn parse_id(arg: &str) -> CommandId {
    arg.parse::<CommandId>()
        .unwrap_or_else(|_| cli_utils::exit_with_error(&format!("Invalid command ID '{}'", arg)))
}
