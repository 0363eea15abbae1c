use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bookpost::config::{SessionCache, Settings};
use bookpost::store::{AuthStore, BookStore, NewBook, VisitorStore};
use bookpost::supabase::SupabaseClient;

#[derive(Parser)]
#[command(name = "bookpost", version, about = "Record and browse book journal entries")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new account
    Signup {
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        nickname: Option<String>,
    },
    /// Sign in and record today's visit
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Change the profile nickname
    Nickname { new_nickname: String },
    /// Upload a profile image
    Avatar { path: PathBuf },
    /// List all books, newest first
    List,
    /// Show one book
    Show { id: i64 },
    /// Add a book entry
    Add {
        title: String,
        #[arg(long, default_value = "")]
        text: String,
    },
    /// Edit a book's title and/or text
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        text: Option<String>,
    },
    /// Delete a book
    Rm { id: i64 },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = Settings::load()?;
    let client = SupabaseClient::new(&settings);

    let cache = SessionCache::new(SessionCache::default_path());
    if let Some(session) = cache.load() {
        client.set_session(Some(session));
    }

    let auth = AuthStore::new(client.clone(), cache);
    let books = BookStore::new(client.clone());
    let visitors = VisitorStore::new(client.clone(), auth.clone());

    match cli.command {
        Command::Signup {
            email,
            password,
            name,
            nickname,
        } => {
            auth.sign_up_with_email(&email, &password, &name, nickname.as_deref())
                .await?;
            println!("Account registered for {email}. Check your inbox if confirmation is required.");
        }

        Command::Login { email, password } => {
            auth.sign_in_with_email(&email, &password).await?;
            println!("Signed in as {email}.");

            // The browser app recorded a visit on load; the CLI records it
            // on login. Best-effort: a failure doesn't fail the login.
            if let Err(e) = visitors.save_visitor().await {
                tracing::warn!(error = %e, "Could not record visit");
            }
        }

        Command::Logout => {
            auth.logout().await;
            println!("Signed out.");
        }

        Command::Whoami => {
            auth.check_session().await?;
            match auth.user() {
                Some(user) => {
                    println!("Signed in as {}", user.email.as_deref().unwrap_or("<no email>"));
                    println!("  name:     {}", user.name);
                    if let Some(nickname) = &user.nickname {
                        println!("  nickname: {nickname}");
                    }
                    if let Some(url) = &user.avatar_url {
                        println!("  avatar:   {url}");
                    }
                }
                None => println!("Not signed in."),
            }
        }

        Command::Nickname { new_nickname } => {
            auth.check_session().await?;
            auth.update_user_nickname(&new_nickname).await?;
            println!("Nickname changed to {new_nickname}.");
        }

        Command::Avatar { path } => {
            auth.check_session().await?;
            let bytes = std::fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("avatar.bin");
            let url = auth.upload_profile_image(file_name, bytes).await?;
            println!("Profile image updated: {url}");
        }

        Command::List => {
            books.fetch_books().await?;
            let list = books.books();
            if list.is_empty() {
                println!("No books yet.");
            }
            for book in list {
                println!("{:>6}  {}  {}", book.id, book.formatted_created_at, book.title);
            }
        }

        Command::Show { id } => {
            let book = books.fetch_book_by_id(id).await?;
            println!("#{} {}", book.id, book.title);
            println!("{}", book.formatted_created_at);
            println!();
            println!("{}", book.text);
        }

        Command::Add { title, text } => {
            let book = books.save_book(NewBook { title, text }).await?;
            println!("Saved book #{}: {}", book.id, book.title);
        }

        Command::Edit { id, title, text } => {
            // Fill in whichever field wasn't given from the current record.
            let current = books.fetch_book_by_id(id).await?;
            let title = title.unwrap_or(current.title);
            let text = text.unwrap_or(current.text);
            books.update_book(id, &title, &text).await?;
            println!("Updated book #{id}.");
        }

        Command::Rm { id } => {
            books.delete_book(id).await?;
            println!("Deleted book #{id}.");
        }
    }

    Ok(())
}
