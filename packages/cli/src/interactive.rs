//! Interactive menu.
//!
//! Loops over a `dialoguer` menu until the user quits, keeping one
//! [`App`] (and so one set of caches) for the whole session.

use anomaly_atlas_dashboard_models::analysis::RiskLevel;
use anomaly_atlas_dashboard_models::prediction::{ExamplePreset, PredictionRequest};
use dialoguer::{Confirm, Input, Select};

use crate::app::App;

/// Actions available in the menu.
enum Action {
    Summary,
    States,
    StateDetail,
    Districts,
    Map,
    Deselect,
    Refresh,
    Analysis,
    Prediction,
    Policies,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Summary,
        Self::States,
        Self::StateDetail,
        Self::Districts,
        Self::Map,
        Self::Deselect,
        Self::Refresh,
        Self::Analysis,
        Self::Prediction,
        Self::Policies,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Summary => "National summary",
            Self::States => "List states",
            Self::StateDetail => "State details",
            Self::Districts => "District breakdown",
            Self::Map => "Map overview",
            Self::Deselect => "Close state panel",
            Self::Refresh => "Refresh data",
            Self::Analysis => "Analysis report",
            Self::Prediction => "Risk prediction",
            Self::Policies => "Policy recommendations",
            Self::Quit => "Quit",
        }
    }
}

fn prompt_state() -> Result<String, dialoguer::Error> {
    Input::<String>::new()
        .with_prompt("State name")
        .interact_text()
}

fn prompt_rate(name: &str) -> Result<f64, dialoguer::Error> {
    Input::<f64>::new()
        .with_prompt(name)
        .default(0.0)
        .interact_text()
}

/// Fills the prediction form from a preset or from prompts.
async fn prompt_prediction(app: &mut App) -> Result<PredictionRequest, dialoguer::Error> {
    let mut choices = vec!["Enter figures".to_string()];
    choices.extend(
        ExamplePreset::ALL
            .iter()
            .map(|p| format!("Example: {p} risk")),
    );
    let choice = Select::new()
        .with_prompt("Prediction input")
        .items(&choices)
        .default(0)
        .interact()?;
    if let Some(preset) = choice.checked_sub(1).and_then(|i| ExamplePreset::ALL.get(i)) {
        return Ok(preset.request());
    }

    let states = app.prediction_states().await;
    let state = if states.is_empty() {
        prompt_state()?
    } else {
        let idx = Select::new()
            .with_prompt("State")
            .items(&states)
            .default(0)
            .interact()?;
        states[idx].clone()
    };

    Ok(PredictionRequest {
        state,
        records: Input::new().with_prompt("Total records").interact_text()?,
        anomalies: Input::new().with_prompt("Anomalous records").interact_text()?,
        invalid_pin_rate: prompt_rate("Invalid PIN rate (0-1)")?,
        duplicate_rate: prompt_rate("Duplicate rate (0-1)")?,
        missing_dob_rate: prompt_rate("Missing DOB rate (0-1)")?,
    })
}

/// Lists policies, then offers one in full and a task for it.
async fn browse_policies(app: &mut App) -> Result<(), dialoguer::Error> {
    const LEVELS: [Option<RiskLevel>; 5] = [
        None,
        Some(RiskLevel::Critical),
        Some(RiskLevel::High),
        Some(RiskLevel::Medium),
        Some(RiskLevel::Low),
    ];
    let labels: Vec<String> = LEVELS
        .iter()
        .map(|l| l.map_or_else(|| "all".to_string(), |l| l.to_string()))
        .collect();
    let level = Select::new()
        .with_prompt("Severity")
        .items(&labels)
        .default(0)
        .interact()?;

    let cards = app.policies(LEVELS[level]).await;
    if cards.is_empty() {
        return Ok(());
    }

    let mut titles: Vec<String> = cards
        .iter()
        .map(|c| format!("#{} {}", c.id, c.title))
        .collect();
    titles.push("Back".to_string());
    let picked = Select::new()
        .with_prompt("Open a policy")
        .items(&titles)
        .default(0)
        .interact()?;
    let Some(card) = cards.get(picked) else {
        return Ok(());
    };

    if app.policy(card.id).await
        && Confirm::new()
            .with_prompt("Create a task for this policy?")
            .default(false)
            .interact()?
    {
        app.create_task(card.id).await;
    }
    Ok(())
}

/// Runs the menu loop.
///
/// # Errors
///
/// Returns an error if the terminal prompt fails.
pub async fn run(app: &mut App) -> Result<(), Box<dyn std::error::Error>> {
    println!("Anomaly Atlas");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::Summary => app.summary().await,
            Action::States => app.states().await,
            Action::StateDetail => app.state(&prompt_state()?).await,
            Action::Districts => app.districts(&prompt_state()?).await,
            Action::Map => app.map(None).await,
            Action::Deselect => app.deselect(),
            Action::Refresh => app.refresh().await,
            Action::Analysis => app.analysis().await,
            Action::Prediction => {
                let request = prompt_prediction(app).await?;
                app.predict(&request).await;
            }
            Action::Policies => browse_policies(app).await?,
            Action::Quit => return Ok(()),
        }
    }
}
