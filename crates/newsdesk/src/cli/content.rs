//! Content moderation command handlers.

use super::commands::{ContentCommands, OutputFormat};
use newsdesk::collaborators::LogNotifier;
use newsdesk_bot::ReviewService;
use newsdesk_core::{ContentEdit, ContentItem, ContentStatus, Platform};
use newsdesk_database::{PgContentRepository, connection_pool};
use newsdesk_error::{NewsdeskError, NewsdeskResult, PipelineError, PipelineErrorKind};
use std::str::FromStr;
use std::sync::Arc;

fn review_service() -> NewsdeskResult<ReviewService> {
    let pool = connection_pool()?;
    Ok(ReviewService::new(
        Arc::new(PgContentRepository::new(pool)),
        Arc::new(LogNotifier),
    ))
}

fn parse_status(value: &str) -> NewsdeskResult<ContentStatus> {
    Ok(ContentStatus::from_str(value)?)
}

fn parse_platforms(values: &[String]) -> NewsdeskResult<Vec<Platform>> {
    values
        .iter()
        .filter(|value| !value.is_empty())
        .map(|value| {
            Platform::from_str(value).map_err(|_| {
                NewsdeskError::from(PipelineError::new(PipelineErrorKind::UnrecognizedValue {
                    field: "platform",
                    value: value.clone(),
                }))
            })
        })
        .collect()
}

fn build_edit(
    title: Option<String>,
    text: Option<String>,
    platforms: Option<Vec<String>>,
) -> NewsdeskResult<ContentEdit> {
    let platforms = platforms.as_deref().map(parse_platforms).transpose()?;
    Ok(ContentEdit {
        translated_title: title,
        translated_text: text,
        platforms,
        image: None,
    })
}

fn print_summary(item: &ContentItem) {
    let title = item
        .translated_title
        .as_deref()
        .or(item.source_title.as_deref())
        .unwrap_or("(untitled)");
    println!("#{:<5} {:<18} {}", item.id, item.status.to_string(), title);
}

/// Handle content moderation commands.
pub async fn handle_content_command(cmd: ContentCommands) -> NewsdeskResult<()> {
    let service = review_service()?;
    match cmd {
        ContentCommands::Pending => {
            let items = service.pending().await?;
            for item in &items {
                print_summary(item);
            }
            println!("Total: {} awaiting approval", items.len());
        }

        ContentCommands::List {
            status,
            limit,
            format,
        } => {
            let status = status.as_deref().map(parse_status).transpose()?;
            let items = service.history(status, limit).await?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&items)?);
                }
                OutputFormat::Human => {
                    for item in &items {
                        print_summary(item);
                    }
                    println!("Total: {} items", items.len());
                }
            }
        }

        ContentCommands::Show { id } => {
            let item = service.show(id).await?;
            println!("{}", serde_json::to_string_pretty(&item)?);
        }

        ContentCommands::Trail { id } => {
            let entries = service.trail(id).await?;
            for entry in &entries {
                println!(
                    "{} {:<14} {:<12} {}",
                    entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.action.to_string(),
                    entry.actor,
                    entry.details.as_deref().unwrap_or("")
                );
            }
        }

        ContentCommands::Approve {
            id,
            moderator,
            platforms,
        } => {
            let platforms = parse_platforms(&platforms)?;
            let item = service.approve(id, &moderator, platforms).await?;
            println!(
                "#{} approved for {:?} by {}",
                item.id, item.platforms, moderator
            );
        }

        ContentCommands::Edit {
            id,
            moderator,
            title,
            text,
            platforms,
        } => {
            let edit = build_edit(title, text, platforms)?;
            if edit.is_empty() {
                println!("Nothing to change; pass --title, --text, or --platforms");
                return Ok(());
            }
            let item = service.edit(id, edit, &moderator).await?;
            println!("#{} edited by {}", item.id, moderator);
        }

        ContentCommands::Reject {
            id,
            moderator,
            reason,
        } => {
            let item = service.reject(id, &moderator, &reason).await?;
            println!("#{} rejected by {}: {}", item.id, moderator, reason);
        }

        ContentCommands::Stats => {
            let counts = service.stats().await?;
            for (status, count) in &counts {
                println!("{:<18} {}", status, count);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_edit_maps_flags_into_fields() {
        let edit = build_edit(
            Some("Revised headline".to_string()),
            None,
            Some(vec!["facebook".to_string(), "linkedin".to_string()]),
        )
        .unwrap();
        assert_eq!(edit.translated_title.as_deref(), Some("Revised headline"));
        assert!(edit.translated_text.is_none());
        assert_eq!(
            edit.platforms,
            Some(vec![Platform::Facebook, Platform::Linkedin])
        );
        assert!(!edit.is_empty());
    }

    #[test]
    fn build_edit_without_flags_is_empty() {
        let edit = build_edit(None, None, None).unwrap();
        assert!(edit.is_empty());
    }

    #[test]
    fn build_edit_rejects_unknown_platform() {
        let err = build_edit(None, None, Some(vec!["myspace".to_string()])).unwrap_err();
        assert!(format!("{}", err).contains("myspace"));
    }
}
