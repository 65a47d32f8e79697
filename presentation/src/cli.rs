use crate::view::{TerminalView, PLACEHOLDER};
use application::ask_service::{AskOutcome, AskService};
use clap::Parser;
use dialoguer::{theme::ColorfulTheme, Input};
use domain::ask_state::AskState;
use infrastructure::config::Config;
use infrastructure::generation::GenerationBackend;
use infrastructure::retrieval_client::RetrievalClient;
use shared::confirmation::ask_confirmation;
use shared::types::Result;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ragask")]
#[command(about = "Ask a question of your documents: retrieve relevant chunks, then stream an answer")]
pub struct Cli {
    /// Model identifier sent to the generation endpoint
    #[arg(long)]
    pub model: Option<String>,

    /// Generation backend: openai or ollama
    #[arg(long)]
    pub provider: Option<String>,

    /// Ask a single question and exit, even when it is empty
    #[arg(long)]
    pub once: bool,

    /// The question to ask (interactive mode when omitted)
    #[arg(trailing_var_arg = true)]
    pub question: Vec<String>,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_to(&self, config: &mut Config) -> Result<()> {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(provider) = &self.provider {
            config.provider = provider.parse()?;
        }
        Ok(())
    }

    pub fn is_one_shot(&self) -> bool {
        self.once || !self.question.is_empty()
    }

    pub fn question_text(&self) -> String {
        self.question.join(" ")
    }
}

pub struct CliApp {
    service: AskService<RetrievalClient, GenerationBackend>,
}

impl CliApp {
    pub fn new(config: &Config) -> Self {
        let service = AskService::new(
            RetrievalClient::from_config(config),
            GenerationBackend::from_config(config),
            config.model.clone(),
        );
        info!(provider = %config.provider, model = %config.model, "ask service ready");
        Self { service }
    }

    pub async fn run(&self, cli: &Cli) -> Result<()> {
        if cli.is_one_shot() {
            self.ask(cli.question_text()).await?;
            Ok(())
        } else {
            self.handle_interactive().await
        }
    }

    async fn handle_interactive(&self) -> Result<()> {
        loop {
            let query: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt(PLACEHOLDER)
                .allow_empty(true)
                .interact_text()?;
            println!();

            self.ask(query).await?;
            println!();

            if !ask_confirmation("Ask another question?", true)? {
                break;
            }
        }
        Ok(())
    }

    /// One ask rendered as a live form. Only terminal write errors are
    /// returned; ask failures show up as an idle form with no answer.
    async fn ask(&self, query: String) -> Result<AskOutcome> {
        let mut state = AskState::with_query(query);
        let mut view = TerminalView::stdout();
        let mut draw_error = None;

        let outcome = self
            .service
            .ask(&mut state, |s| {
                if let Err(e) = view.draw(s) {
                    draw_error.get_or_insert(e);
                }
            })
            .await;

        match draw_error {
            Some(e) => Err(e.into()),
            None => Ok(outcome),
        }
    }
}
