use anyhow::Result;
use voicecards_core::Settings;

use crate::args::ConfigArgs;
use crate::interactive;

/// Settings as stored on disk, without environment overrides
fn load_stored() -> Result<Settings> {
    let path = Settings::path();
    if path.exists() {
        Settings::load_from(&path)
    } else {
        Ok(Settings::default())
    }
}

pub fn run(args: &ConfigArgs) -> Result<()> {
    if args.path {
        println!("{}", Settings::path().display());
        return Ok(());
    }

    let mut settings = load_stored()?;
    let mut changed = false;

    if let Some(url) = &args.api_url {
        settings.api_url = url.trim().to_string();
        changed = true;
    }
    if let Some(url) = &args.transcription_url {
        settings.transcription.url = url.trim().to_string();
        changed = true;
    }
    if let Some(model) = &args.transcription_model {
        settings.transcription.model = model.trim().to_string();
        changed = true;
    }
    if let Some(key) = &args.api_key {
        settings.transcription.api_key = Some(key.trim().to_string()).filter(|k| !k.is_empty());
        changed = true;
    }
    if let Some(language) = &args.language {
        let language = language.trim().to_lowercase();
        settings.language = (language != "auto" && !language.is_empty()).then_some(language);
        changed = true;
    }
    if let Some(route) = &args.delete_route {
        if !route.contains("{id}") {
            anyhow::bail!("Delete route must contain an {{id}} placeholder, e.g. /cards/delete/{{id}}");
        }
        settings.delete_route = route.trim().to_string();
        changed = true;
    }
    if let Some(timeout) = args.timeout {
        settings.request_timeout_secs = timeout;
        changed = true;
    }

    if changed {
        settings.validate()?;
        settings.save()?;
        interactive::success(&format!("Saved {}", Settings::path().display()));
    }

    let mut shown = settings.clone();
    if shown.transcription.api_key.is_some() {
        shown.transcription.api_key = Some("***".to_string());
    }
    println!("{}", serde_json::to_string_pretty(&shown)?);
    Ok(())
}
