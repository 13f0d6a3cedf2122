//! Interactive yes/no prompts for the permission gate

use async_trait::async_trait;
use console::style;
use dialoguer::Confirm;
use dialoguer::theme::ColorfulTheme;
use termcoder_core::approval::{ConfirmationRequest, Confirmer};

/// Asks on the terminal; Ctrl-C, end of input or any terminal error count as "no"
pub struct DialoguerConfirmer;

#[async_trait]
impl Confirmer for DialoguerConfirmer {
    async fn confirm(&self, request: &ConfirmationRequest) -> bool {
        println!("{} {}", style(format!("{}:", request.action)).yellow().bold(), request.details);

        let answer = tokio::task::spawn_blocking(|| {
            Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt("Allow?")
                .default(false)
                .interact()
        })
        .await;

        match answer {
            Ok(Ok(approved)) => approved,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Confirmation prompt interrupted");
                println!();
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Confirmation prompt task failed");
                false
            }
        }
    }
}
