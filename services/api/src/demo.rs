use crate::infra::{parse_date, parse_status, InMemoryApplicationStore};
use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use clap::Args;
use std::sync::Arc;

use broker_desk::error::AppError;
use broker_desk::workflows::lending::applications::{
    ApplicationId, ApplicationStatus, ApplicationWithTask, BrokerId, LoanApplication,
    LoanApplicationPayload, LoanApplicationService, SetupTask, TaskId, TaskStatus,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Acting broker for the scripted listings (defaults to broker-ames)
    #[arg(long)]
    pub(crate) broker: Option<String>,
    /// Earliest submission date to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) submitted_from: Option<NaiveDate>,
    /// Latest submission date to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) submitted_until: Option<NaiveDate>,
    /// Only list applications with a completed setup task
    #[arg(long)]
    pub(crate) completed: bool,
    /// Restrict the listing to these statuses (comma separated)
    #[arg(long, value_parser = parse_status, value_delimiter = ',')]
    pub(crate) statuses: Vec<ApplicationStatus>,
    /// Skip the submission portion of the demo
    #[arg(long)]
    pub(crate) skip_submission: bool,
}

fn seeded_at(submitted_on: NaiveDate) -> DateTime<Utc> {
    submitted_on
        .and_hms_opt(10, 0, 0)
        .expect("valid time")
        .and_utc()
}

fn seeded_application(
    id: &str,
    broker_id: &str,
    applicant_name: &str,
    status: ApplicationStatus,
    loan_amount: u64,
    submitted_on: NaiveDate,
) -> LoanApplication {
    LoanApplication {
        id: ApplicationId(id.to_string()),
        broker_id: BrokerId(broker_id.to_string()),
        applicant_name: applicant_name.to_string(),
        loan_amount,
        term_months: 240,
        status,
        submitted_at: seeded_at(submitted_on),
    }
}

fn seeded_task(id: &str, application_id: &str, broker_id: &str, status: TaskStatus) -> SetupTask {
    SetupTask {
        id: TaskId(id.to_string()),
        application_id: ApplicationId(application_id.to_string()),
        assigned_broker_id: BrokerId(broker_id.to_string()),
        status,
    }
}

/// Seed a small portfolio across two brokers. Amounts sum to 600,000 over
/// four records, so the starting average is exactly 150,000.
fn seed(store: &InMemoryApplicationStore, today: NaiveDate) {
    store.seed_application(seeded_application(
        "app-000101",
        "broker-ames",
        "Rosa Fuentes",
        ApplicationStatus::Submitted,
        150_000,
        today - Duration::days(30),
    ));
    store.seed_application(seeded_application(
        "app-000102",
        "broker-ames",
        "Jon Halvorsen",
        ApplicationStatus::Approved,
        240_000,
        today - Duration::days(14),
    ));
    store.seed_application(seeded_application(
        "app-000103",
        "broker-ames",
        "Priya Raman",
        ApplicationStatus::Rejected,
        95_000,
        today - Duration::days(5),
    ));
    store.seed_application(seeded_application(
        "app-000201",
        "broker-cedar",
        "Sam Whitfield",
        ApplicationStatus::Submitted,
        115_000,
        today - Duration::days(10),
    ));

    store.seed_task(seeded_task(
        "task-000101",
        "app-000101",
        "broker-ames",
        TaskStatus::Pending,
    ));
    store.seed_task(seeded_task(
        "task-000102",
        "app-000102",
        "broker-ames",
        TaskStatus::Completed,
    ));
    store.seed_task(seeded_task(
        "task-000103",
        "app-000103",
        "broker-ames",
        TaskStatus::Cancelled,
    ));
    store.seed_task(seeded_task(
        "task-000201",
        "app-000201",
        "broker-cedar",
        TaskStatus::Pending,
    ));
}

fn render_listing(rows: &[ApplicationWithTask]) {
    if rows.is_empty() {
        println!("  (no applications matched)");
        return;
    }

    for row in rows {
        let task_note = match &row.task {
            Some(task) => format!(" | task {} ({})", task.id.0, task.status.label()),
            None => String::new(),
        };
        println!(
            "  - {} | {} | {} | {} | submitted {}{}",
            row.application.id.0,
            row.application.applicant_name,
            row.application.status.label(),
            row.application.loan_amount,
            row.application.submitted_at.date_naive(),
            task_note
        );
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        broker,
        submitted_from,
        submitted_until,
        completed,
        statuses,
        skip_submission,
    } = args;

    let acting_broker = BrokerId(broker.unwrap_or_else(|| "broker-ames".to_string()));
    let today = Local::now().date_naive();

    let store = Arc::new(InMemoryApplicationStore::default());
    seed(&store, today);
    let service = LoanApplicationService::new(store);

    println!("Broker application desk demo");
    println!("Acting broker: {}", acting_broker.0);

    println!("\nRequested listing");
    let rows = service.list(
        &acting_broker,
        submitted_from,
        submitted_until,
        completed,
        &statuses,
    )?;
    render_listing(&rows);

    if !completed {
        println!("\nWith a completed setup task only");
        let rows = service.list(&acting_broker, None, None, true, &[])?;
        render_listing(&rows);
    }

    if !skip_submission {
        println!("\nSubmitting two new applications");
        let at_average = service.submit(
            &acting_broker,
            LoanApplicationPayload {
                applicant_name: "Marta Okafor".to_string(),
                loan_amount: 150_000,
                term_months: 240,
            },
        )?;
        println!(
            "  - {}: {} (echoed amount: {:?})",
            at_average.application.id.0,
            at_average.assessment.message(),
            at_average.echoed_amount
        );

        let above = service.submit(
            &acting_broker,
            LoanApplicationPayload {
                applicant_name: "Devon Clarke".to_string(),
                loan_amount: 260_000,
                term_months: 180,
            },
        )?;
        println!(
            "  - {}: {} (echoed amount: {:?})",
            above.application.id.0,
            above.assessment.message(),
            above.echoed_amount
        );
    }

    Ok(())
}
