use clap::Parser;
use std::process;
use store_ratings::{
    TokenCodec, TokenPayload,
    config::{Env, load_jwt_secret},
    models::{Role, UnknownRole},
};

/// Signs a bearer token with the configured JWT_SECRET and prints it.
#[derive(Parser, Debug)]
#[command(name = "issue-token", version, about)]
struct Args {
    /// User id to embed in the token
    #[arg(long)]
    id: i32,

    /// User email to embed in the token
    #[arg(long)]
    email: String,

    /// One of: admin, user, store_owner
    #[arg(long, value_parser = parse_role)]
    role: Role,
}

fn parse_role(value: &str) -> Result<Role, String> {
    value.parse().map_err(|e: UnknownRole| e.to_string())
}

fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Only the signing secret is needed, so DATABASE_URL may be absent.
    let secret = match load_jwt_secret(Env::from_env()) {
        Ok(secret) => secret,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let payload = TokenPayload {
        id: args.id,
        email: args.email,
        role: args.role,
    };

    match TokenCodec::new(&secret).issue(&payload) {
        Ok(token) => println!("{token}"),
        Err(e) => {
            eprintln!("error: cannot sign token: {e}");
            process::exit(1);
        }
    }
}
