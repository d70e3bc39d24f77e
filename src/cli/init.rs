use crate::cli::PolicyArgs;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path, shellexpand_path};

pub fn run(policy: &PolicyArgs, report_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    policy.apply(&mut settings);
    if let Some(dir) = report_dir {
        settings.report_dir = shellexpand_path(&dir);
    }
    save_settings(&settings)?;

    println!("Saved settings to {}", settings_path().display());
    println!("Reports will be written to {}", settings.report_dir);
    Ok(())
}
