use crate::infra::{load_catalog, ConsoleNavigator};
use admissions_portal::api::{
    AccessToken, AdmissionsBackend, ApiError, HttpAdmissionsClient, UploadedFile,
};
use admissions_portal::config::AppConfig;
use admissions_portal::error::AppError;
use admissions_portal::telemetry;
use admissions_portal::workflows::application::{
    ApplicationSubmissionFlow, ApplicationValidationError, SubmissionState,
};
use admissions_portal::workflows::attachments::DocumentSlot;
use admissions_portal::workflows::signature::{Point, SignatureMethod};
use admissions_portal::workflows::token::{
    AdminAcceptanceFlow, MaritalStatus, ProfileCompletionFlow, RedirectSchedule,
    TokenActionState, VisaEligibility,
};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Args, Debug, Default)]
pub(crate) struct CoursesArgs {
    /// Only courses whose title or description contains this text
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Only courses at this level, e.g. "Bachelor's Degree"
    #[arg(long)]
    pub(crate) level: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ApplyArgs {
    /// Applicant's full name
    #[arg(long)]
    pub(crate) name: String,
    /// Applicant's email address
    #[arg(long)]
    pub(crate) email: String,
    /// Optional phone number
    #[arg(long)]
    pub(crate) phone: Option<String>,
    /// Course id from the catalog (see `courses`)
    #[arg(long)]
    pub(crate) course: String,
    /// 10th/Matric result card
    #[arg(long)]
    pub(crate) result_card_1: Option<PathBuf>,
    /// 12th/Intermediate result card
    #[arg(long)]
    pub(crate) result_card_2: Option<PathBuf>,
    /// CNIC or national id scan
    #[arg(long)]
    pub(crate) cnic: Option<PathBuf>,
    #[arg(long)]
    pub(crate) certificate: Option<PathBuf>,
    #[arg(long)]
    pub(crate) passport: Option<PathBuf>,
}

impl ApplyArgs {
    fn documents(&self) -> Vec<(DocumentSlot, &PathBuf)> {
        [
            (DocumentSlot::ResultCard1, &self.result_card_1),
            (DocumentSlot::ResultCard2, &self.result_card_2),
            (DocumentSlot::Cnic, &self.cnic),
            (DocumentSlot::Certificate, &self.certificate),
            (DocumentSlot::Passport, &self.passport),
        ]
        .into_iter()
        .filter_map(|(slot, path)| path.as_ref().map(|path| (slot, path)))
        .collect()
    }
}

#[derive(Args, Debug)]
pub(crate) struct AcceptArgs {
    /// Token from the admin email link
    #[arg(long)]
    pub(crate) token: String,
    /// Skip the confirmation prompt
    #[arg(long)]
    pub(crate) yes: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CompleteProfileArgs {
    /// Token from the acceptance email link
    #[arg(long)]
    pub(crate) token: String,
    /// single, married, divorced or widowed
    #[arg(long)]
    pub(crate) marital_status: MaritalStatus,
    /// yes, no, not_sure or already_have
    #[arg(long)]
    pub(crate) visa_eligible: VisaEligibility,
    /// Signature image (JPG or PNG)
    #[arg(long, required_unless_present = "signature_strokes")]
    pub(crate) signature_file: Option<PathBuf>,
    /// Drawn signature as a JSON array of strokes, each an array of {"x","y"} points
    #[arg(long, conflicts_with = "signature_file")]
    pub(crate) signature_strokes: Option<String>,
}

struct Session {
    config: AppConfig,
    backend: HttpAdmissionsClient,
}

impl Session {
    fn open() -> Result<Self, AppError> {
        let config = AppConfig::load()?;
        telemetry::init(&config.telemetry)?;
        let backend = HttpAdmissionsClient::new(config.api.clone())?;
        Ok(Self { config, backend })
    }

    fn redirect(&self) -> RedirectSchedule {
        RedirectSchedule::new(Arc::new(ConsoleNavigator), &self.config.navigation)
    }
}

pub(crate) fn run_courses(args: CoursesArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let catalog = load_catalog(&config)?;
    let courses = catalog.filter(args.search.as_deref(), args.level.as_deref());

    if courses.is_empty() {
        println!("No courses found");
        return Ok(());
    }
    println!("Programmes open for applications");
    for course in courses {
        println!(
            "- {} ({}): {} | {} | {}",
            course.title, course.id, course.level, course.duration, course.price
        );
        println!("  {}", course.short_description);
    }
    Ok(())
}

pub(crate) async fn run_apply(args: ApplyArgs) -> Result<(), AppError> {
    let session = Session::open()?;
    let catalog = Arc::new(load_catalog(&session.config)?);
    let mut flow = ApplicationSubmissionFlow::new(catalog, &session.config.uploads);

    flow.set_name(args.name.as_str());
    flow.set_email(args.email.as_str());
    if let Some(phone) = &args.phone {
        flow.set_phone(phone.as_str());
    }
    if !flow.advance() {
        return Err(stalled(&flow));
    }

    flow.select_course(args.course.as_str());
    if !flow.advance() {
        return Err(stalled(&flow));
    }

    for (slot, path) in args.documents() {
        let file = UploadedFile::from_path(path)?;
        flow.attach(slot, file)?;
        println!("Attached {} for {}", path.display(), slot.label());
    }

    let Some(payload) = flow.begin_submit()? else {
        return Err(stalled(&flow));
    };
    println!("Submitting application...");
    let outcome = tokio::select! {
        result = session.backend.submit_application(payload) => result,
        _ = tokio::signal::ctrl_c() => Err(ApiError::Cancelled),
    };
    let failure = outcome.as_ref().err().cloned();

    match flow.complete_submit(outcome) {
        SubmissionState::Submitted(result) => {
            println!("Application Submitted!");
            println!("Application ID: {}", result.application_id);
            println!("Submitted: {}", result.submitted_at.to_rfc3339());
            Ok(())
        }
        SubmissionState::Failed { message } => {
            eprintln!("{message}");
            Err(failure.unwrap_or(ApiError::Cancelled).into())
        }
        _ => {
            println!("Submission cancelled.");
            Ok(())
        }
    }
}

fn stalled(flow: &ApplicationSubmissionFlow) -> AppError {
    match flow.draft().to_payload(flow.catalog()) {
        Err(err) => err.into(),
        Ok(_) => ApplicationValidationError::InvalidState(format!(
            "application stopped at step {} of {}",
            flow.current_step(),
            flow.total_steps()
        ))
        .into(),
    }
}

pub(crate) async fn run_accept(args: AcceptArgs) -> Result<(), AppError> {
    let session = Session::open()?;
    let mut flow = AdminAcceptanceFlow::load(AccessToken::new(args.token), session.redirect());
    if flow.state() == &TokenActionState::NoToken {
        return Err(missing_token());
    }

    if !args.yes && !confirm("Accept this application? This cannot be undone. [y/N] ").await? {
        flow.cancel_confirmation();
        println!("Acceptance cancelled; nothing was sent.");
        return Ok(());
    }

    let Some(token) = flow.begin_accept() else {
        return Ok(());
    };
    println!("Accepting application...");
    let outcome = tokio::select! {
        result = session.backend.accept_application(&token) => result,
        _ = tokio::signal::ctrl_c() => Err(ApiError::Cancelled),
    };
    let failure = outcome.as_ref().err().cloned();
    let state = flow.complete_accept(outcome).clone();

    report_token_outcome(&state, failure, "Application accepted successfully", &session)?;
    if state.is_terminal() {
        flow.wait_for_redirect().await;
    }
    Ok(())
}

pub(crate) async fn run_complete_profile(args: CompleteProfileArgs) -> Result<(), AppError> {
    let session = Session::open()?;
    let mut flow = ProfileCompletionFlow::load(
        AccessToken::new(args.token),
        session.redirect(),
        &session.config.uploads,
    );
    if flow.state() == &TokenActionState::NoToken {
        return Err(missing_token());
    }

    flow.set_marital_status(args.marital_status);
    flow.set_visa_eligibility(args.visa_eligible);
    if let Some(signature) = flow.signature_mut() {
        match (&args.signature_file, &args.signature_strokes) {
            (Some(path), _) => {
                signature.set_method(SignatureMethod::Upload);
                signature.attach_upload(UploadedFile::from_path(path)?)?;
            }
            (None, Some(raw)) => {
                let strokes: Vec<Vec<Point>> = serde_json::from_str(raw).map_err(|err| {
                    AppError::InvalidInput(format!("signature strokes are not valid JSON ({err})"))
                })?;
                signature.replay(&strokes);
            }
            (None, None) => {}
        }
    }

    let Some(payload) = flow.begin_submit()? else {
        return Ok(());
    };
    println!("Completing profile...");
    let outcome = tokio::select! {
        result = session.backend.complete_profile(payload) => result,
        _ = tokio::signal::ctrl_c() => Err(ApiError::Cancelled),
    };
    let failure = outcome.as_ref().err().cloned();
    let state = flow.complete_submit(outcome).clone();

    report_token_outcome(&state, failure, "Profile completed successfully", &session)?;
    if state.is_terminal() {
        flow.wait_for_redirect().await;
    }
    Ok(())
}

fn report_token_outcome(
    state: &TokenActionState,
    failure: Option<ApiError>,
    success: &str,
    session: &Session,
) -> Result<(), AppError> {
    match state {
        TokenActionState::Success { message } => {
            println!("{}", message.as_deref().unwrap_or(success));
            println!(
                "Redirecting to {} in {}s...",
                session.config.navigation.home_path,
                session.config.navigation.redirect_delay.as_secs()
            );
            Ok(())
        }
        TokenActionState::Error { message } => {
            eprintln!("{message}");
            Err(failure.unwrap_or(ApiError::Cancelled).into())
        }
        _ => {
            println!("Request cancelled.");
            Ok(())
        }
    }
}

fn missing_token() -> AppError {
    AppError::InvalidInput("Invalid link: no access token was provided".to_string())
}

async fn confirm(prompt: &str) -> Result<bool, AppError> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(prompt.as_bytes()).await?;
    stdout.flush().await?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
