//! Quick console run of a full adventure session.

use conteur_core::{
    ChatRequest, ChatRole, ChatService, FileSessionStore, GeminiNarrator, IncomingMessage,
    ThemeCatalog,
};
use std::io::{self, BufRead, Write};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let service = ChatService::new(
        GeminiNarrator::from_env()?,
        FileSessionStore::new("sessions"),
    );

    println!("=== Conteur ===\n");
    for theme in ThemeCatalog::builtin().themes() {
        println!("  {} {}", theme.icon, theme.name);
    }

    print!("\nThème ? ");
    io::stdout().flush()?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let theme = lines.next().unwrap_or(Ok(String::new()))?;

    print!("Ton prénom ? ");
    io::stdout().flush()?;
    let name = lines.next().unwrap_or(Ok(String::new()))?;

    let opening = service
        .handle_turn(ChatRequest {
            theme: Some(theme.trim().to_string()),
            age_group: Some("Adulte".to_string()),
            gender: Some("Garçon".to_string()),
            player_name: Some(name.trim().to_string()),
            turn_count: Some(12.into()),
            ..Default::default()
        })
        .await?;

    println!("\n{}\n", opening.reply);

    let session_id = opening.session_id;
    let mut history = opening.history;

    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(Ok(line)) = lines.next() else { break };
        if line.trim().is_empty() {
            break;
        }

        let incoming = history
            .iter()
            .map(|m| {
                IncomingMessage::new(
                    match m.role {
                        ChatRole::Player => "player",
                        ChatRole::Narrator => "narrator",
                    },
                    m.content.clone(),
                )
            })
            .collect();

        match service
            .handle_turn(ChatRequest {
                session_id: Some(session_id.clone()),
                message: Some(line),
                history: Some(incoming),
                ..Default::default()
            })
            .await
        {
            Ok(turn) => {
                println!("\n{}\n", turn.reply);
                history = turn.history;
            }
            Err(failure) => {
                eprintln!("! {failure}");
            }
        }
    }

    Ok(())
}
