use crate::cli::context::AppContext;
use crate::domain::ServiceId;
use crate::infra::config::{config_path, default_config_dir, install_default_config};
use crate::infra::credentials;
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub fn init(config_dir: &Path) -> Result<bool> {
    info!("Preparing config in {:?}", config_dir);

    if install_default_config(config_dir)? {
        println!("Wrote {:?}", config_path(config_dir));
    } else {
        println!("{:?} already exists, left untouched", config_path(config_dir));
    }

    if config_dir != default_config_dir() {
        println!("Pass --config-dir {:?} or set PISTACK_CONFIG_DIR to use it.", config_dir);
    }

    Ok(true)
}

/// Reports runtime and tool availability. Fails when the runtime is missing.
pub fn doctor(ctx: &AppContext) -> Result<bool> {
    println!("Checking dependencies and configuration...");
    let mut healthy = true;

    match ctx.runtime.check_available() {
        Ok(()) => println!(
            "✓ {} with compose plugin available",
            ctx.settings.runtime_binary
        ),
        Err(e) => {
            healthy = false;
            println!("✗ {e}");
        }
    }

    if ctx.issuer.is_available() {
        println!("✓ openssl available");
    } else {
        println!("• openssl not found (needed by vaultwarden)");
    }

    let config_file = config_path(&ctx.config_dir);
    if config_file.exists() {
        println!("✓ config: {:?}", config_file);
    } else {
        println!("• no config at {:?}, using defaults (see 'pistack init')", config_file);
    }

    let root = ctx.layout().root();
    if root.is_dir() {
        println!("✓ services directory: {:?}", root);
    } else {
        println!("• services directory {:?} will be created on first install", root);
    }

    println!("• host address {} / timezone {}", ctx.host().ip, ctx.host().timezone);

    Ok(healthy)
}

pub fn catalog(ctx: &AppContext) -> Result<bool> {
    println!("{:<13} {:<10} DESCRIPTION", "SERVICE", "INSTALLED");
    for id in ServiceId::ALL {
        let installed = if ctx.layout().is_installed(id) {
            "yes"
        } else {
            "no"
        };
        println!("{:<13} {:<10} {}", id, installed, id.definition().label);
    }
    Ok(true)
}

pub fn info(ctx: &AppContext, identifier: &str) -> Result<bool> {
    let id: ServiceId = identifier.parse()?;
    print_hints(ctx, id)?;
    Ok(true)
}

/// Post-install hints: where to browse and where the credentials live.
pub fn print_hints(ctx: &AppContext, id: ServiceId) -> Result<()> {
    let def = id.definition();
    let layout = ctx.layout();

    println!("{}", def.label);
    println!("  url:      {}", def.url(&ctx.host().ip));
    println!(
        "  manifest: {:?}{}",
        layout.manifest_path(id),
        if layout.is_installed(id) {
            ""
        } else {
            " (not installed)"
        }
    );

    if def.secrets.is_empty() {
        return Ok(());
    }

    let creds_path = layout.credentials_path(id);
    println!("  credentials: {:?}", creds_path);
    let stored = credentials::read(&creds_path)?;
    for (name, value) in stored.iter() {
        println!("    {name}={value}");
    }

    Ok(())
}
