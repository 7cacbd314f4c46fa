//! Client for `/v1/get-image-transform-command`: fetches the server's
//! command, rewrites it for the local instance directory, and runs it.

use crate::cli::args::ImageCommandArgs;
use crate::core::invoker::TOOL_NAME;
use crate::server::api::TransformCommandResponse;
use anyhow::{anyhow, bail, Context};
use std::path::Path;
use tokio::process::Command;
use url::Url;

/// Thin HTTP client bound to one spatial backend server.
#[derive(Clone)]
pub struct ImageCommandClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ImageCommandClient {
    pub fn new(server_address: &str) -> crate::Result<Self> {
        let base_url = Url::parse(server_address)
            .with_context(|| format!("invalid server address '{}'", server_address))?;
        if base_url.cannot_be_a_base() {
            bail!("server address '{}' cannot be used as a base URL", server_address);
        }
        Ok(ImageCommandClient {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    /// Ask the server for the command resampling an image from `source_space`
    /// into `target_space`.
    pub async fn fetch_command(
        &self,
        source_space: &str,
        target_space: &str,
    ) -> crate::Result<Vec<String>> {
        let url = self.command_url(source_space, target_space)?;
        tracing::debug!(url = %url, "requesting image transform command");
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow!(
                "image transform command request failed: {} {}",
                status,
                text
            ));
        }
        let body = resp.json::<TransformCommandResponse>().await?;
        Ok(body.transform_command)
    }

    fn command_url(&self, source_space: &str, target_space: &str) -> crate::Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("server address cannot carry a path"))?
            .pop_if_empty()
            .extend(["v1", "get-image-transform-command"]);
        url.query_pairs_mut()
            .append_pair("source_space", source_space)
            .append_pair("target_space", target_space)
            .append_pair("input_coords", "auto");
        Ok(url)
    }
}

/// Whether an argument names a transform file shipped in the instance directory.
pub fn is_transform(argument: &str) -> bool {
    argument.contains(".ima") || argument.contains(".trm")
}

/// Rewrite a server command for local execution.
///
/// Transform files get the instance path prefixed, then `-i`, `-o` and the
/// extra arguments are appended. Anything not starting with the expected
/// tool is refused.
pub fn format_command(
    server_command: &[String],
    instance_path: &Path,
    input: &str,
    output: &str,
    extra: &[String],
) -> crate::Result<Vec<String>> {
    let mut command: Vec<String> = server_command
        .iter()
        .map(|argument| {
            if is_transform(argument) {
                instance_path.join(argument).to_string_lossy().into_owned()
            } else {
                argument.clone()
            }
        })
        .collect();
    command.extend(["-i".to_string(), input.to_string()]);
    command.extend(["-o".to_string(), output.to_string()]);
    command.extend(extra.iter().cloned());

    match command.first() {
        Some(program) if program == TOOL_NAME => Ok(command),
        Some(program) => Err(anyhow!(
            "refusing to run '{}': the server command must start with {}",
            program,
            TOOL_NAME
        )),
        None => Err(anyhow!("server returned an empty transform command")),
    }
}

pub async fn run(args: ImageCommandArgs) -> crate::Result<i32> {
    let client = ImageCommandClient::new(&args.server_address)?;
    let server_command = client
        .fetch_command(&args.source_space, &args.target_space)
        .await?;
    let command = format_command(
        &server_command,
        &args.instance_path,
        &args.input,
        &args.output,
        &args.extra,
    )?;

    println!("{}", shell_words::join(&command));
    if args.dry_run {
        return Ok(0);
    }

    let status = Command::new(&command[0])
        .args(&command[1..])
        .status()
        .await
        .with_context(|| format!("failed to launch {}", command[0]))?;
    tracing::info!(status = %status, "image transform finished");
    Ok(status.code().unwrap_or(1))
}
