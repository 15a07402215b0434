use crate::infra::{parse_choices, ConfiguredLeadStore, ConfiguredNotifier};
use clap::Args;
use data_maturity::config::{AppConfig, LeadStoreConfig};
use data_maturity::error::AppError;
use data_maturity::survey::{
    AssessmentError, AssessmentResult, AssessmentService, AssessmentSession, CollaboratorWarning,
    Identity, IntakeMode, LeadStore, MaturityTier, Notifier, Phase, SessionId, SurveyCatalog,
    CANONICAL_TIERS,
};
use data_maturity::telemetry;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct TakeArgs {
    /// Start at the first question without collecting contact details
    #[arg(long)]
    pub(crate) skip_intake: bool,
    /// Append captured leads to this CSV file instead of the configured backend
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Comma separated option numbers, one per question (e.g. 1,2,3,4,1,2,3)
    #[arg(long)]
    pub(crate) choices: String,
    /// Print the result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_take(args: TakeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(path) = args.csv {
        config.leads = LeadStoreConfig::Csv { path };
    }
    if args.skip_intake {
        config.survey.intake_mode = IntakeMode::Skipped;
    }
    telemetry::init(&config.telemetry)?;

    let store = Arc::new(ConfiguredLeadStore::from_config(&config.leads).await?);
    let notifier = Arc::new(ConfiguredNotifier::from_config(&config.notification)?);
    let service = AssessmentService::new(
        Arc::new(SurveyCatalog::standard()),
        store,
        notifier,
        config.survey.intake_mode,
    );

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();
    take_interactive(&service, &mut input, &mut output).await
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs { choices, json } = args;
    let choices = parse_choices(&choices)
        .map_err(|message| io::Error::new(io::ErrorKind::InvalidInput, message))?;
    let result = score_choices(Arc::new(SurveyCatalog::standard()), &choices)?;

    let mut output = io::stdout().lock();
    if json {
        let rendered = serde_json::to_string_pretty(&result)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        writeln!(output, "{rendered}")?;
    } else {
        render_result(&mut output, &result)?;
    }
    Ok(())
}

pub(crate) fn run_catalog() -> Result<(), AppError> {
    let mut output = io::stdout().lock();
    render_catalog(&mut output, &SurveyCatalog::standard())?;
    Ok(())
}

/// Score a full set of 1-based option positions without collaborators.
pub(crate) fn score_choices(
    catalog: Arc<SurveyCatalog>,
    choices: &[usize],
) -> Result<AssessmentResult, AppError> {
    if choices.len() != catalog.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("expected {} choices, got {}", catalog.len(), choices.len()),
        )
        .into());
    }

    let mut session = AssessmentSession::new(
        SessionId("assessment-offline".to_string()),
        catalog.clone(),
        IntakeMode::Skipped,
    );
    for (index, choice) in choices.iter().enumerate() {
        let label = catalog
            .question(index)
            .zip(choice.checked_sub(1))
            .and_then(|(question, offset)| question.options.get(offset))
            .map(|option| option.label.clone())
            .ok_or_else(|| AssessmentError::InvalidSelection {
                position: index + 1,
                label: choice.to_string(),
            })?;
        session.select(&label)?;
    }

    session.result().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "survey did not complete").into()
    })
}

pub(crate) async fn take_interactive<S, N, R, W>(
    service: &AssessmentService<S, N>,
    input: &mut R,
    output: &mut W,
) -> Result<(), AppError>
where
    S: LeadStore + 'static,
    N: Notifier + 'static,
    R: BufRead,
    W: Write,
{
    writeln!(output, "Data maturity assessment")?;
    writeln!(
        output,
        "{} questions, scored 1 to 4. Answer with the option number.\n",
        service.catalog().len()
    )?;

    let mut session = service.start(None);

    while session.phase() == Phase::Intake {
        let Some(identity) = prompt_identity(input, output)? else {
            writeln!(output, "\nInput closed before the survey started.")?;
            return Ok(());
        };
        match service.confirm_intake(&mut session, identity).await {
            Ok(outcome) => render_warnings(output, &outcome.warnings)?,
            Err(err) => writeln!(output, "{err}")?,
        }
    }

    while let Some(question) = session.current_question().cloned() {
        writeln!(
            output,
            "\nQuestion {} of {} ({}% complete) | {}",
            session.cursor() + 1,
            service.catalog().len(),
            session.progress_percent(),
            question.domain
        )?;
        writeln!(output, "{}", question.prompt)?;
        for (index, option) in question.options.iter().enumerate() {
            writeln!(output, "  {}. {}", index + 1, option.label)?;
        }

        let Some(reply) = prompt_line(input, output, "Your answer")? else {
            writeln!(output, "\nInput closed; answers so far were not scored.")?;
            return Ok(());
        };
        let label = reply
            .parse::<usize>()
            .ok()
            .and_then(|choice| choice.checked_sub(1))
            .and_then(|index| question.options.get(index))
            .map_or(reply.clone(), |option| option.label.clone());

        if let Err(err) = service.advance(&mut session, &label) {
            writeln!(output, "{err}")?;
        }
    }

    let Some(result) = session.result() else {
        return Ok(());
    };
    writeln!(output)?;
    render_result(output, &result)?;

    let wants_follow_up = prompt_line(input, output, "\nRequest a data strategy workshop? [y/N]")?
        .is_some_and(|reply| reply.eq_ignore_ascii_case("y") || reply.eq_ignore_ascii_case("yes"));
    if !wants_follow_up {
        return Ok(());
    }

    let contact = if session.identity().is_some() {
        None
    } else {
        match prompt_identity(input, output)? {
            Some(identity) => Some(identity),
            None => return Ok(()),
        }
    };

    match service.request_follow_up(&session, contact).await {
        Ok(receipt) => {
            if receipt.stored || receipt.notified {
                writeln!(output, "Thanks, we will be in touch about your workshop.")?;
            }
            render_warnings(output, &receipt.warnings)?;
        }
        Err(err) => writeln!(output, "{err}")?,
    }
    Ok(())
}

fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> io::Result<Option<String>> {
    write!(output, "{label}: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt_identity<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<Identity>> {
    writeln!(output, "Tell us about you and your organisation.")?;
    let mut fields = Vec::with_capacity(4);
    for label in ["Name", "Email", "Industry", "Annual turnover"] {
        match prompt_line(input, output, label)? {
            Some(value) => fields.push(value),
            None => return Ok(None),
        }
    }
    Ok(Some(Identity::new(
        &fields[0], &fields[1], &fields[2], &fields[3],
    )))
}

fn render_warnings<W: Write>(output: &mut W, warnings: &[CollaboratorWarning]) -> io::Result<()> {
    for warning in warnings {
        writeln!(output, "Warning ({:?}): {}", warning.collaborator, warning.message)?;
    }
    Ok(())
}

pub(crate) fn render_result<W: Write>(output: &mut W, result: &AssessmentResult) -> io::Result<()> {
    writeln!(output, "{}", result.score_line())?;
    writeln!(output, "Maturity tier: {}", result.tier_label)?;
    writeln!(output, "{}", result.recommendation)?;
    writeln!(output, "\nBy domain:")?;
    for entry in &result.domain_scores {
        writeln!(output, "  - {}: {} ({})", entry.domain, entry.score, entry.message)?;
    }
    Ok(())
}

pub(crate) fn render_catalog<W: Write>(output: &mut W, catalog: &SurveyCatalog) -> io::Result<()> {
    for (index, question) in catalog.questions().iter().enumerate() {
        writeln!(output, "{}. [{}] {}", index + 1, question.domain, question.prompt)?;
        for option in &question.options {
            writeln!(output, "     {} pt  {}", option.score, option.label)?;
        }
    }

    writeln!(output, "\nTiers (table {}):", CANONICAL_TIERS.version())?;
    for tier in MaturityTier::ordered() {
        if let Some((low, high)) =
            CANONICAL_TIERS.range_for(tier, catalog.min_total(), catalog.max_total())
        {
            writeln!(output, "  {low:>2}-{high:<2} {}", tier.label())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemoryLeadStore;
    use data_maturity::survey::{DisabledNotifier, LeadRowKind};
    use std::io::Cursor;

    fn service(
        mode: IntakeMode,
    ) -> (
        AssessmentService<InMemoryLeadStore, DisabledNotifier>,
        InMemoryLeadStore,
    ) {
        let store = InMemoryLeadStore::default();
        let service = AssessmentService::new(
            Arc::new(SurveyCatalog::standard()),
            Arc::new(store.clone()),
            Arc::new(DisabledNotifier),
            mode,
        );
        (service, store)
    }

    #[test]
    fn score_choices_maps_positions_to_tiers() {
        let result = score_choices(Arc::new(SurveyCatalog::standard()), &[4, 4, 4, 4, 1, 1, 1])
            .expect("scored");
        assert_eq!(result.total_score, 19);
        assert_eq!(result.tier, MaturityTier::DataDrivenPro);

        let mut rendered = Vec::new();
        render_result(&mut rendered, &result).expect("rendered");
        let text = String::from_utf8(rendered).expect("utf8");
        assert!(text.starts_with("Total Score: 19 out of 28"));
        assert!(text.contains("Maturity tier: Data-Driven Pro"));
    }

    #[test]
    fn score_choices_rejects_bad_input() {
        let catalog = Arc::new(SurveyCatalog::standard());
        assert!(matches!(
            score_choices(catalog.clone(), &[1, 2, 3]),
            Err(AppError::Io(_))
        ));
        assert!(matches!(
            score_choices(catalog, &[1, 2, 3, 5, 1, 1, 1]),
            Err(AppError::Assessment(AssessmentError::InvalidSelection {
                position: 4,
                ..
            }))
        ));
    }

    #[test]
    fn catalog_listing_shows_tier_ranges() {
        let mut rendered = Vec::new();
        render_catalog(&mut rendered, &SurveyCatalog::standard()).expect("rendered");
        let text = String::from_utf8(rendered).expect("utf8");
        assert!(text.contains("1. [Strategy & Leadership]"));
        assert!(text.contains(" 7-8  Early Stage"));
        assert!(text.contains("18-28 Data-Driven Pro"));
    }

    #[tokio::test]
    async fn interactive_session_records_intake_and_follow_up() {
        let (service, store) = service(IntakeMode::Required);
        let script = "Ada Lovelace\n\nManufacturing\n£1m-£5m\n\
                      Ada Lovelace\nada@example.com\nManufacturing\n£1m-£5m\n\
                      9\n2\n2\n2\n2\n2\n2\n2\ny\n";
        let mut input = Cursor::new(script.as_bytes());
        let mut output = Vec::new();

        take_interactive(&service, &mut input, &mut output)
            .await
            .expect("session runs");

        let text = String::from_utf8(output).expect("utf8");
        assert!(text.contains("please provide your email"));
        assert!(text.contains("is not an option for question 1"));
        assert!(text.contains("Total Score: 14 out of 28"));
        assert!(text.contains("Maturity tier: Emerging Leader"));
        assert!(text.contains("Thanks, we will be in touch"));

        let rows = store.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, LeadRowKind::Intake);
        assert_eq!(rows[1].kind, LeadRowKind::Completion);
    }

    #[tokio::test]
    async fn closed_input_stops_without_scoring() {
        let (service, store) = service(IntakeMode::Skipped);
        let mut input = Cursor::new("1\n2\n".as_bytes());
        let mut output = Vec::new();

        take_interactive(&service, &mut input, &mut output)
            .await
            .expect("session runs");

        let text = String::from_utf8(output).expect("utf8");
        assert!(text.contains("Question 3 of 7"));
        assert!(text.contains("answers so far were not scored"));
        assert!(store.rows().is_empty());
    }
}
