use crate::infra::{load_catalog, InMemoryConfirmationPublisher, InMemoryRegistrationRepository};
use clap::Args;
use sailors_open::config::AppConfig;
use sailors_open::error::AppError;
use sailors_open::registration::{
    roster_csv, Category, FlowStep, Question, RegistrationDraft, RegistrationFlow,
    RegistrationService, SkillLevel, MARKETS,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the pause between auto-advanced questions.
    #[arg(long)]
    pub(crate) no_pacing: bool,
    /// Market to register from (defaults to Singapore).
    #[arg(long)]
    pub(crate) market: Option<String>,
}

pub(crate) fn run_catalog() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let catalog = load_catalog(&config.flow)?;

    println!("Categories");
    for category in Category::ALL {
        let partner = if category.is_doubles() {
            " (partner required)"
        } else {
            ""
        };
        println!("- {}{}", category, partner);
    }

    println!("\nLocations");
    for market in MARKETS {
        println!("- {}: {}", market.name, market.cities.join(", "));
    }

    println!("\nMatchmaker questions");
    for (index, question) in catalog.questions().iter().enumerate() {
        render_question(index, catalog.len(), question);
        for option in &question.options {
            match &option.tag {
                Some(tag) => println!("    [{}] {} ({})", option.id, option.label, tag),
                None => println!("    [{}] {}", option.id, option.label),
            }
        }
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { no_pacing, market } = args;

    let config = AppConfig::load()?;
    let catalog = Arc::new(load_catalog(&config.flow)?);
    let pacing = if no_pacing {
        Duration::ZERO
    } else {
        config.flow.auto_advance_delay
    };

    let repository = Arc::new(InMemoryRegistrationRepository::default());
    let notices = Arc::new(InMemoryConfirmationPublisher::default());
    let service = RegistrationService::new(catalog.clone(), repository, notices.clone());
    let mut flow = RegistrationFlow::new(catalog);

    println!("Sailors Open registration demo");
    println!("\nStep 1: {}", flow.step());

    fill_identity(flow.draft_mut()?, market.as_deref().unwrap_or("Singapore"));
    if flow.begin_matchmaker().is_err() {
        if let Some(notice) = flow.notice() {
            println!("  Blocked: {}", notice.message);
        }
    }

    let draft = flow.draft_mut()?;
    draft.email = "jane.wang@sea.com".to_string();
    draft.toggle_category(Category::MensSingles);
    println!("  Selected: {}", draft.category_labels().join(", "));
    draft.toggle_category(Category::WomensSingles);
    println!(
        "  Switched to Women's Singles, selection now: {}",
        draft.category_labels().join(", ")
    );
    draft.toggle_category(Category::MixedDoubles);
    draft.partner_name = "Wei Chen".to_string();
    draft.partner_email = "wei.chen@sea.com".to_string();
    println!(
        "  Added Mixed Doubles with partner {} <{}>",
        draft.partner_name, draft.partner_email
    );

    flow.begin_matchmaker()?;
    println!("\nStep 2: {}", flow.step());

    while flow.step() == FlowStep::Matchmaker {
        let index = flow.quiz().current_index();
        let question = flow.quiz().current_question().clone();
        render_question(index, flow.quiz().catalog().len(), &question);

        if question.multi_select {
            for option_id in multi_choices(&question) {
                flow.select_option(&option_id, &service)?;
                println!("    + {}", label_of(&question, &option_id));
            }
            flow.advance(&service)?;
        } else {
            let option_id = single_choice(&question);
            println!("    > {}", label_of(&question, &option_id));
            flow.select_option(&option_id, &service)?;
            if flow.step() == FlowStep::Matchmaker && !pacing.is_zero() {
                thread::sleep(pacing);
            }
        }
        println!("    progress {:.0}%", flow.progress_fraction() * 100.0);
    }

    println!("\nStep 3: {}", flow.step());
    if let Some(message) = flow.confirmation_message() {
        println!("  {}", message);
    }
    if let Some(receipt) = flow.receipt() {
        println!("  Registration id: {}", receipt.registration_id.0);
        let stored = service.get(&receipt.registration_id);
        match stored.map(|record| serde_json::to_string_pretty(&record.view())) {
            Ok(Ok(json)) => println!("  Public registration payload:\n{}", json),
            Ok(Err(err)) => println!("  Public registration payload unavailable: {}", err),
            Err(err) => println!("  Registration lookup failed: {}", err),
        }
    }

    let events = notices.events();
    if events.is_empty() {
        println!("  Confirmations: none dispatched");
    } else {
        println!("  Confirmations:");
        for notice in events {
            println!(
                "    - template={} -> {}",
                notice.template, notice.registration_id.0
            );
        }
    }

    match service.roster(100) {
        Ok(records) => {
            let csv = roster_csv(&records)?;
            println!("\nOrganiser roster\n{}", String::from_utf8_lossy(&csv));
        }
        Err(err) => println!("\nOrganiser roster unavailable: {}", err),
    }

    flow.start_over()?;
    println!("Ready for the next registrant ({})", flow.step());
    Ok(())
}

/// Details without an email so the first attempt shows the validation notice.
fn fill_identity(draft: &mut RegistrationDraft, market: &str) {
    draft.full_name = "Jane Wang".to_string();
    draft.set_market(market);
    draft.self_reported_level = Some(SkillLevel::Intermediate);
    println!(
        "  {} registering from {} / {}",
        draft.full_name, draft.market, draft.city
    );
}

fn render_question(index: usize, total: usize, question: &Question) {
    let kind = if question.multi_select {
        "choose any"
    } else {
        "choose one"
    };
    println!("  [{}/{}] {} ({})", index + 1, total, question.prompt, kind);
}

/// Middle-of-the-road pick so the demo lands on an intermediate pairing.
fn single_choice(question: &Question) -> String {
    question
        .options
        .get(question.options.len() / 2)
        .map(|option| option.id.clone())
        .unwrap_or_default()
}

fn multi_choices(question: &Question) -> Vec<String> {
    question
        .options
        .iter()
        .step_by(2)
        .map(|option| option.id.clone())
        .collect()
}

fn label_of<'a>(question: &'a Question, option_id: &'a str) -> &'a str {
    question
        .option(option_id)
        .map(|option| option.label.as_str())
        .unwrap_or(option_id)
}
