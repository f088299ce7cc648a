// UI layer: interactive menu around `ApiClient` using `dialoguer`.
// Every action runs one API call behind a spinner and prints the JSON.

use crate::api::{ApiClient, RemoteUploadOptions, UploadOptions};
use crate::error::ApiError;
use crate::response::ApiResponse;
use anyhow::Result;
use dialoguer::{Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

/// Build a client from the environment, prompting for the login and key
/// when `STREAMTAPE_LOGIN` / `STREAMTAPE_KEY` are missing.
pub fn connect() -> Result<ApiClient> {
    match ApiClient::from_env() {
        Ok(api) => Ok(api),
        Err(ApiError::Config { reason }) => {
            println!("{reason}; enter credentials manually.");
            let login: String = Input::new().with_prompt("API login").interact_text()?;
            let key: String = Password::new().with_prompt("API key").interact()?;
            Ok(ApiClient::new(&login, &key, None)?)
        }
        Err(e) => Err(e.into()),
    }
}

/// Main interactive menu; loops until the user picks "Exit".
pub fn main_menu(api: &ApiClient) -> Result<()> {
    let items = [
        "Account info",
        "List files",
        "File info",
        "Create folder",
        "Remote upload",
        "Remote upload status",
        "Upload file",
        "Exit",
    ];
    loop {
        let selection = Select::new().items(&items[..]).default(0).interact()?;
        let outcome = match selection {
            0 => handle_account_info(api),
            1 => handle_list_files(api),
            2 => {
                let file: String = Input::new().with_prompt("File id").interact_text()?;
                run("Fetching file info...", || api.file_info(&file)).map(|r| print_json(&r))
            }
            3 => handle_new_folder(api),
            4 => handle_remote_upload(api),
            5 => {
                let id: String = Input::new()
                    .with_prompt("Remote upload id")
                    .interact_text()?;
                run("Checking status...", || api.remote_upload_status(&id)).map(|r| print_json(&r))
            }
            6 => handle_upload(api),
            _ => break,
        };
        if let Err(e) = outcome {
            println!("Request failed: {e}");
        }
    }
    Ok(())
}

fn handle_account_info(api: &ApiClient) -> Result<()> {
    let info = run("Fetching account info...", || api.account_info())?;
    match account_email(info.json()) {
        Some(email) => println!("Account email: {email}"),
        None => print_json(&info),
    }
    Ok(())
}

fn handle_list_files(api: &ApiClient) -> Result<()> {
    let folder: String = Input::new()
        .with_prompt("Folder id (empty for root)")
        .allow_empty(true)
        .interact_text()?;
    let folder = Some(folder.trim()).filter(|f| !f.is_empty());
    let listing = run("Listing files...", || api.list_files(folder, None, None))?;
    let names = file_names(listing.json());
    if names.is_empty() {
        println!("No files.");
    }
    for name in names {
        println!("File: {name}");
    }
    Ok(())
}

fn handle_new_folder(api: &ApiClient) -> Result<()> {
    let name: String = Input::new().with_prompt("Folder name").interact_text()?;
    let parent: String = Input::new()
        .with_prompt("Parent folder id (empty for root)")
        .allow_empty(true)
        .interact_text()?;
    let parent = Some(parent.trim()).filter(|p| !p.is_empty());
    let created = run("Creating folder...", || api.new_folder(&name, parent))?;
    print_json(&created);
    Ok(())
}

fn handle_remote_upload(api: &ApiClient) -> Result<()> {
    let url: String = Input::new().with_prompt("Source URL").interact_text()?;
    let name: String = Input::new()
        .with_prompt("Store as (empty keeps the remote name)")
        .allow_empty(true)
        .interact_text()?;
    let options = RemoteUploadOptions {
        name: Some(name.trim().to_string()).filter(|n| !n.is_empty()),
        ..Default::default()
    };
    let job = run("Queueing remote upload...", || api.remote_upload(&url, &options))?;
    print_json(&job);
    Ok(())
}

fn handle_upload(api: &ApiClient) -> Result<()> {
    let path: String = Input::new().with_prompt("Local file path").interact_text()?;
    let path = expand_home(path.trim());
    let compute_sha256 = Confirm::new()
        .with_prompt("Send a SHA-256 checksum?")
        .default(false)
        .interact()?;
    let options = UploadOptions {
        compute_sha256,
        ..Default::default()
    };
    let uploaded = run("Uploading...", || api.upload(&path, &options))?;
    print_json(&uploaded);
    Ok(())
}

/// Run one API call while a spinner is shown.
fn run<F>(message: &'static str, call: F) -> Result<ApiResponse>
where
    F: FnOnce() -> crate::error::Result<ApiResponse>,
{
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = call();
    spinner.finish_and_clear();
    Ok(result?)
}

fn print_json(response: &ApiResponse) {
    match response.to_json_pretty() {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{response}"),
    }
}

/// `result.email`, or a top-level `email` for older response shapes.
pub fn account_email(value: &Value) -> Option<&str> {
    value
        .pointer("/result/email")
        .or_else(|| value.get("email"))
        .and_then(Value::as_str)
}

/// Names of the files in a folder listing (`result.files` or `files`).
pub fn file_names(value: &Value) -> Vec<String> {
    value
        .pointer("/result/files")
        .or_else(|| value.get("files"))
        .and_then(Value::as_array)
        .map(|files| {
            files
                .iter()
                .filter_map(|f| f.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
