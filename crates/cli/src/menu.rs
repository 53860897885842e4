//! Interactive console menu.
//!
//! All user interaction lives here; the synchronization core only ever
//! sees typed operations.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};

use cozysync_core::{error, AppConfig, GameProfile, SaveSlot, SaveSync};

const BANNER: &str = r#" ==================================
|                                  |
|    CCCC      GGGG      SSSS      |
|   C         G         S          |
|   C         G  GGG     SSS       |
|   C         G    G        S      |
|    CCCC      GGGG      SSSS      |
|                                  |
|   +  COZY  -  GAME  -  SYNC  +   |
|                                  |
 =================================="#;

/// Top-level menu choices.
enum MainCommand {
    Manage(usize),
    Exit,
}

/// Per-game menu choices.
enum GameCommand {
    Adopt,
    Publish(usize),
    Back,
}

/// Run the menu loop until the operator exits.
pub fn run(config: &AppConfig, sync: &SaveSync) -> Result<()> {
    if sync.games().is_empty() {
        println!("No games have a save path configured; nothing to sync.");
        println!("Add root_path entries to config.toml and run again.");
        return Ok(());
    }

    loop {
        clear_screen()?;
        println!("{BANNER}");
        println!();
        println!("Your share code: {}", config.remote.shared_code);
        println!();
        match prompt_main(sync.games())? {
            MainCommand::Exit => return Ok(()),
            MainCommand::Manage(index) => {
                let game = sync.games()[index].clone();
                manage_game(sync, &game)?;
            }
        }
    }
}

fn prompt_main(games: &[GameProfile]) -> Result<MainCommand> {
    loop {
        println!(" ==================================");
        println!("OPTIONS:");
        for (index, game) in games.iter().enumerate() {
            println!("{}) Manage {}", index + 1, title_case(&game.id));
        }
        println!("0) Exit");
        println!();
        let choice = prompt("Choice? > ")?;
        match parse_main(&choice, games.len()) {
            Some(command) => return Ok(command),
            None => println!("Invalid option, try again."),
        }
    }
}

fn parse_main(input: &str, game_count: usize) -> Option<MainCommand> {
    match input.trim().parse::<usize>().ok()? {
        0 => Some(MainCommand::Exit),
        choice if choice <= game_count => Some(MainCommand::Manage(choice - 1)),
        _ => None,
    }
}

fn manage_game(sync: &SaveSync, game: &GameProfile) -> Result<()> {
    clear_screen()?;
    println!();
    match sync.check_freshness(&game.id) {
        Ok(freshness) => println!(
            "{} cloud save - last updated {}",
            title_case(&game.id),
            freshness
        ),
        Err(err) => println!("Could not reach the cloud save: {:#}", anyhow::Error::new(err)),
    }
    println!();

    // A broken local save should not block adopting the remote one, so a
    // failed listing degrades to an adopt-only menu.
    let slots = match sync.list_saves(&game.id) {
        Ok(slots) => slots,
        Err(err) => {
            println!("Could not list local saves: {:#}", anyhow::Error::new(err));
            Vec::new()
        }
    };

    match prompt_game(&slots)? {
        GameCommand::Back => Ok(()),
        GameCommand::Adopt => report(sync.adopt(&game.id), "SAVE UPDATED!"),
        GameCommand::Publish(index) => {
            report(sync.publish(&game.id, &slots[index]), "FILE UPLOADED!")
        }
    }
}

fn prompt_game(slots: &[SaveSlot]) -> Result<GameCommand> {
    loop {
        println!(" ==================================");
        println!("OPTIONS:");
        println!("1) Download cloud save");
        for (index, slot) in slots.iter().enumerate() {
            println!("{}) Upload {}", index + 2, slot.display_name);
        }
        println!("0) Go back");
        println!();
        let choice = prompt("Choice? > ")?;
        match parse_game(&choice, slots.len()) {
            Some(command) => return Ok(command),
            None => println!("Invalid option, try again."),
        }
    }
}

fn parse_game(input: &str, slot_count: usize) -> Option<GameCommand> {
    match input.trim().parse::<usize>().ok()? {
        0 => Some(GameCommand::Back),
        1 => Some(GameCommand::Adopt),
        choice if choice - 2 < slot_count => Some(GameCommand::Publish(choice - 2)),
        _ => None,
    }
}

fn report(result: error::Result<()>, success: &str) -> Result<()> {
    match result {
        Ok(()) => println!("=== ++ {success} ++ ==="),
        Err(err) => {
            let err = anyhow::Error::new(err);
            tracing::error!("sync operation failed: {err:#}");
            println!("Operation failed: {err:#}");
        }
    }
    pause()
}

fn pause() -> Result<()> {
    prompt("Press Enter to continue... ")?;
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn clear_screen() -> Result<()> {
    execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
    Ok(())
}

fn title_case(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
