mod display;

use std::path::PathBuf;
use std::sync::Arc;

use addrbook_app::{AddressListController, AuthState, Header, LoginSurface, Profile, Route};
use addrbook_core::{AddressField, AddressId, Region};
use addrbook_store::{AddressBackend, AddressRepository, LocalStore};
use addrbook_sync::HttpBackend;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "addrbook", version, about = "Manage your saved postal addresses")]
struct Cli {
    /// Address service base URL. Without it a local JSON file is used.
    #[arg(long, env = "ADDRBOOK_SERVER", global = true)]
    server: Option<String>,

    /// Local address file, used when no server is configured.
    #[arg(long, env = "ADDRBOOK_DATA", default_value = "addresses.json", global = true)]
    data: PathBuf,

    /// Bearer token for the address service. Its presence marks the session
    /// as signed in.
    #[arg(long, env = "ADDRBOOK_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Display name shown in the header when signed in.
    #[arg(long, env = "ADDRBOOK_USER", global = true)]
    user: Option<String>,

    /// Route the navigation header is resolved for.
    #[arg(long, default_value = "/address", global = true)]
    route: String,

    /// Debug logging on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show all saved addresses.
    List,
    /// Save a new address.
    Add(FieldArgs),
    /// Change fields of a saved address. Only the given fields are sent.
    Edit {
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a saved address.
    Delete { id: String },
    /// List the accepted values for --state.
    Regions,
    /// Show the login page.
    Login,
}

#[derive(Args)]
struct FieldArgs {
    #[arg(long)]
    full_name: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    street: Option<String>,
    #[arg(long)]
    landmark: Option<String>,
    #[arg(long)]
    pin_code: Option<String>,
    #[arg(long)]
    city: Option<String>,
    /// One of the names printed by `addrbook regions`.
    #[arg(long)]
    state: Option<String>,
}

impl FieldArgs {
    fn given(&self) -> Vec<(AddressField, &str)> {
        [
            (AddressField::FullName, &self.full_name),
            (AddressField::Phone, &self.phone),
            (AddressField::Street, &self.street),
            (AddressField::Landmark, &self.landmark),
            (AddressField::PinCode, &self.pin_code),
            (AddressField::City, &self.city),
            (AddressField::State, &self.state),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

impl Cli {
    fn auth_state(&self) -> AuthState {
        match &self.token {
            Some(_) => AuthState::Authenticated {
                profile: self.user.clone().map(|name| Profile { name, email: None }),
            },
            None => AuthState::Anonymous,
        }
    }

    fn backend(&self) -> anyhow::Result<Arc<dyn AddressBackend>> {
        if let Some(server) = &self.server {
            tracing::info!(server = %server, "using remote address service");
            let mut backend = HttpBackend::new(server.clone());
            if let Some(token) = &self.token {
                backend = backend.with_token(token.clone());
            }
            return Ok(Arc::new(backend));
        }
        tracing::info!(path = %self.data.display(), "using local address file");
        let store = LocalStore::open_persistent(&self.data)
            .with_context(|| format!("opening {}", self.data.display()))?;
        Ok(Arc::new(store))
    }

    fn controller(&self) -> anyhow::Result<AddressListController> {
        let repo = AddressRepository::from_shared(self.backend()?);
        Ok(AddressListController::new(Arc::new(repo)))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();
    tracing::debug!("addrbook v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Command::Regions => {
            for region in Region::ALL {
                println!("{region}");
            }
        }
        Command::Login => {
            let route = Route::Login;
            display::print_header(&Header::resolve(&route, &cli.auth_state()));
            if let Some(surface) = LoginSurface::for_route(&route) {
                display::print_login(&surface);
            }
        }
        Command::List => {
            let mut controller = cli.controller()?;
            controller.refresh().await.context("loading addresses")?;
            let route = Route::parse(&cli.route);
            display::print_header(&Header::resolve(&route, &cli.auth_state()));
            display::print_entries(&controller.entries());
        }
        Command::Add(fields) => {
            let mut controller = cli.controller()?;
            for (field, value) in fields.given() {
                controller.set_new_field(field, value);
            }
            let record = controller
                .submit_new()
                .wait()
                .await
                .context("saving address")?;
            display::print_record(&record);
        }
        Command::Edit { id, fields } => {
            let id = AddressId::from(id.as_str());
            let mut controller = cli.controller()?;
            controller.refresh().await.context("loading addresses")?;
            controller.enter_edit(&id)?;
            for (field, value) in fields.given() {
                controller.edit_field(&id, field, value)?;
            }
            let record = controller
                .save_edit(&id)?
                .wait()
                .await
                .context("updating address")?;
            display::print_record(&record);
        }
        Command::Delete { id } => {
            let id = AddressId::from(id.as_str());
            let mut controller = cli.controller()?;
            controller.refresh().await.context("loading addresses")?;
            controller
                .delete(&id)?
                .wait()
                .await
                .context("deleting address")?;
            println!("Deleted address {id}.");
        }
    }

    Ok(())
}
