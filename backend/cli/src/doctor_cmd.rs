//! CLI Doctor Command
//!
//! Verifies a provisioned host: tesseract and its language data, the
//! upload directory, fonts and the port variable. Any failed required
//! check makes the command exit non-zero.

use anyhow::Result;
use std::env;
use std::path::Path;
use textlift_config::{collect_referenced_vars, config_file_path, load_raw_config, ServiceConfig};
use textlift_media::{FontBook, UploadStore};
use textlift_ocr::{OcrEngine, TesseractEngine, TesseractLocator};

/// Runs every check; `Ok(true)` when all required ones pass.
pub async fn run(explicit_config: Option<&Path>) -> Result<bool> {
    println!("\n🔍 Running textlift doctor...\n");

    let env_ok = check_config_env(explicit_config).await;
    let config = match crate::config::load(explicit_config).await {
        Ok(prepared) => {
            println!("  🟢 Configuration loaded ({})", prepared.environment);
            for warning in &prepared.warnings {
                println!("  🟡 {}: {}", warning.path, warning.message);
            }
            prepared.config
        }
        Err(e) => {
            println!("  🔴 Configuration invalid: {e:#}");
            println!("\n❌ Some checks failed! Please fix the errors above.");
            return Ok(false);
        }
    };

    let tesseract_ok = check_tesseract(&config).await;
    let uploads_ok = check_upload_dir(&config).await;
    check_fonts(&config);
    check_port();

    let is_ok = env_ok && tesseract_ok && uploads_ok;
    println!();
    if is_ok {
        println!("✅ All checks passed! textlift is ready to serve.");
    } else {
        println!("❌ Some checks failed! Please fix the errors above.");
    }
    Ok(is_ok)
}

async fn check_config_env(explicit_config: Option<&Path>) -> bool {
    let path = config_file_path(explicit_config);
    println!("Checking Configuration ({}):", path.display());

    let raw = match load_raw_config(&path).await {
        Ok(raw) => raw,
        Err(e) => {
            println!("  🔴 {e:#}");
            return false;
        }
    };

    let mut all_good = true;
    for var in collect_referenced_vars(&raw) {
        match env::var(&var) {
            Ok(val) if !val.is_empty() => println!("  🟢 {var} is set"),
            _ => {
                println!("  🔴 {var} is referenced by the config but missing (REQUIRED)");
                all_good = false;
            }
        }
    }
    all_good
}

async fn check_tesseract(config: &ServiceConfig) -> bool {
    println!("Checking Tesseract OCR:");

    let Some(location) = TesseractLocator::new(config.ocr.tesseract_path.clone()).locate() else {
        println!("  🔴 tesseract not found on PATH or in common install locations (REQUIRED)");
        return false;
    };
    println!(
        "  🟢 Found {} ({})",
        location.path.display(),
        location.source
    );

    let engine = TesseractEngine::new(&location.path, &config.ocr);
    match engine.version().await {
        Ok(version) => println!("  🟢 Version {version}"),
        Err(e) => {
            println!("  🔴 Could not run tesseract: {e}");
            return false;
        }
    }

    match engine.languages().await {
        Ok(installed) => {
            let missing: Vec<&str> = config
                .ocr
                .language
                .split('+')
                .filter(|lang| !installed.iter().any(|l| l == lang))
                .collect();
            if missing.is_empty() {
                println!("  🟢 Language data for '{}' installed", config.ocr.language);
                true
            } else {
                println!(
                    "  🔴 Missing language data: {} (REQUIRED)",
                    missing.join(", ")
                );
                false
            }
        }
        Err(e) => {
            println!("  🔴 Could not list languages: {e}");
            false
        }
    }
}

async fn check_upload_dir(config: &ServiceConfig) -> bool {
    println!("Checking Upload Directory:");

    let store = UploadStore::new(&config.storage.upload_dir);
    let dir = store.absolute_dir();
    if !dir.is_dir() {
        println!("  🔴 {} does not exist (REQUIRED)", dir.display());
        return false;
    }
    if store.is_writable().await {
        println!("  🟢 {} is writable", dir.display());
        true
    } else {
        println!("  🔴 {} is not writable (REQUIRED)", dir.display());
        false
    }
}

fn check_fonts(config: &ServiceConfig) {
    println!("Checking Fonts:");
    if FontBook::new(config.fonts.extra_paths.clone()).has_any() {
        println!("  🟢 A TrueType font is available for rendering edits");
    } else {
        println!("  🟡 No usable font found; edited blocks will be skipped (optional)");
    }
}

fn check_port() {
    println!("Checking Environment Variables:");
    match env::var("PORT") {
        Ok(val) if !val.is_empty() => println!("  🟢 PORT is set ({val})"),
        _ => println!("  🟡 PORT is missing, using the configured port (optional)"),
    }
}
