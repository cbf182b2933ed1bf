use crate::infra::{InMemoryImageStore, InMemoryPriceStore, InMemoryRegistrationRepository};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use stagepass::config::AppConfig;
use stagepass::error::AppError;
use stagepass::pricing::PriceBoard;
use stagepass::registration::{
    ApplicantDetails, Decision, EventRegistrationService, ImageUpload, RegistrationKind,
    RegistrationRecord, RegistrationSubmission,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the admin review portion of the demo.
    #[arg(long)]
    pub(crate) skip_review: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;

    println!("Registration desk demo");

    let repository = Arc::new(InMemoryRegistrationRepository::default());
    let images = Arc::new(InMemoryImageStore::default());
    let prices = Arc::new(InMemoryPriceStore::default());
    let service = Arc::new(EventRegistrationService::new(
        repository,
        images,
        prices,
        config.admin.clone(),
    ));

    let board = match service.prices() {
        Ok(board) => board,
        Err(err) => {
            println!("  Price board unavailable: {err}");
            return Ok(());
        }
    };
    println!(
        "Current prices: performer Rs.{} | audience Rs.{}",
        board.performer_price, board.audience_price
    );

    println!("\nSubmitting sample registrations");
    let performer = match service.submit(sample_performer()) {
        Ok(record) => record,
        Err(err) => {
            println!("  Performer submission rejected: {err}");
            return Ok(());
        }
    };
    print_submission(&performer);

    // Order ids derive from epoch milliseconds; space the submissions out so
    // the demo never trips over a same-millisecond collision.
    std::thread::sleep(Duration::from_millis(2));

    let audience = match service.submit(sample_audience()) {
        Ok(record) => record,
        Err(err) => {
            println!("  Audience submission rejected: {err}");
            return Ok(());
        }
    };
    print_submission(&audience);

    print_lookup(&service, performer.order_id.as_str());
    print_lookup(&service, audience.order_id.as_str());

    if args.skip_review {
        return Ok(());
    }

    println!("\nAdmin review");
    let Some(token) = service.login(&config.admin.username, &config.admin.password) else {
        println!("  Admin login rejected");
        return Ok(());
    };
    println!("  Session opened: {}", token.0);

    for kind in [RegistrationKind::Performer, RegistrationKind::Audience] {
        match service.roster(kind) {
            Ok(records) => {
                println!("  {} roster ({} pending)", kind.label(), records.len());
                for record in &records {
                    println!(
                        "    - {} | {} | {}",
                        record.order_id,
                        record.applicant.name,
                        record.status.label()
                    );
                }
            }
            Err(err) => println!("  Roster unavailable: {err}"),
        }
    }

    match service.decide(&performer.id, Decision::Approve) {
        Ok(record) => println!("  Approved {}", record.order_id),
        Err(err) => println!("  Approval failed: {err}"),
    }
    match service.decide(&audience.id, Decision::Decline) {
        Ok(record) => println!("  Declined {}", record.order_id),
        Err(err) => println!("  Decline failed: {err}"),
    }

    println!("\nStatus after review");
    print_lookup(&service, performer.order_id.as_str());
    print_lookup(&service, audience.order_id.as_str());

    println!("\nUpdating prices");
    let updated = PriceBoard {
        performer_price: board.performer_price + 50,
        audience_price: board.audience_price + 50,
    };
    match service.set_prices(updated) {
        Ok(()) => println!(
            "  New prices: performer Rs.{} | audience Rs.{}",
            updated.performer_price, updated.audience_price
        ),
        Err(err) => println!("  Price update failed: {err}"),
    }

    service.logout(&token.0);
    println!("  Session closed");

    Ok(())
}

fn print_submission(record: &RegistrationRecord) {
    println!(
        "- {} registration {} -> status {}",
        record.kind.label(),
        record.order_id,
        record.status.label()
    );
}

fn print_lookup<R, S, P>(service: &EventRegistrationService<R, S, P>, order_id: &str)
where
    R: stagepass::registration::RegistrationRepository + 'static,
    S: stagepass::registration::ImageStore + 'static,
    P: stagepass::pricing::PriceStore + 'static,
{
    match service.lookup(order_id) {
        Ok(Some(view)) => match serde_json::to_string(&view) {
            Ok(json) => println!("  Status of {order_id}: {json}"),
            Err(err) => println!("  Status of {order_id} unavailable: {err}"),
        },
        Ok(None) => println!("  Status of {order_id}: not found"),
        Err(err) => println!("  Status of {order_id} unavailable: {err}"),
    }
}

fn sample_performer() -> RegistrationSubmission {
    RegistrationSubmission {
        kind: RegistrationKind::Performer,
        applicant: ApplicantDetails {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            mobile: "9876543210".to_string(),
        },
        transaction_id: "TXN-DEMO-1".to_string(),
        performance_type: Some("Classical vocal".to_string()),
        profile_photo: sample_image("asha.png"),
        payment_screenshot: sample_image("asha-upi.png"),
    }
}

fn sample_audience() -> RegistrationSubmission {
    RegistrationSubmission {
        kind: RegistrationKind::Audience,
        applicant: ApplicantDetails {
            name: "Ravi Menon".to_string(),
            email: "ravi@example.com".to_string(),
            mobile: "9123456780".to_string(),
        },
        transaction_id: "TXN-DEMO-2".to_string(),
        performance_type: None,
        profile_photo: sample_image("ravi.jpg"),
        payment_screenshot: sample_image("ravi-upi.jpg"),
    }
}

fn sample_image(file_name: &str) -> ImageUpload {
    ImageUpload {
        file_name: file_name.to_string(),
        content_type: mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .to_string(),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    }
}
