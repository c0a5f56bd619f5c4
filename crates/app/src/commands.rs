use std::error::Error;
use std::pin::pin;

use futures::StreamExt;
use quiz_core::model::{
    AnnouncementId, AssignmentId, ClassId, Facet, FilterState, QuestionId, UserSession,
};
use services::api::JoinKey;
use services::{
    AppServices, AssignmentStatus, Clock, DayWindow, HistoryFilter, JoinOutcome, MarkRead,
    QuestionSearch, SubmissionOutcome,
};
use tracing::debug;

use crate::args::Command;

type CommandResult = Result<(), Box<dyn Error>>;

pub async fn execute(app: &AppServices, clock: Clock, command: Command) -> CommandResult {
    let restored = app.account().restore().await?;
    debug!(signed_in = restored.is_some(), "session restored");

    match command {
        Command::Login { email, password } => {
            let session = app.account().login(&email, &password).await?;
            println!(
                "Signed in as {}",
                session.display_name().unwrap_or_else(|| email.trim().to_owned())
            );
        }
        Command::Register(request) => {
            app.account().register(&request).await?;
            println!("Registered {}, you can sign in now", request.email.trim());
        }
        Command::Logout => {
            app.account().logout().await?;
            println!("Signed out");
        }
        Command::Whoami => whoami(app, restored).await,
        Command::Questions { filters, pages } => questions(app, filters, pages).await?,
        Command::Facets { facet, filters } => {
            let mut search = search_with(app, &filters);
            for option in search.open_picker(facet).await {
                println!("{option}");
            }
        }
        Command::Practice { question, choice } => practice(app, question, choice).await?,
        Command::Upload(draft) => {
            app.uploads().upload(&draft).await?;
            println!("Question uploaded");
        }
        Command::Classes => {
            for class in app.classes().list_classes().await? {
                println!("{}\t{}\t{}", class.class_id, class.class_name, class.description);
            }
        }
        Command::Class(id) => class(app, clock, id).await?,
        Command::Join(key) => join(app, key).await?,
        Command::Leave(id) => {
            let outcome = app.classes().leave_class(id).await?;
            println!("{}", outcome.message);
        }
        Command::Announcements { class } => announcements(app, class).await,
        Command::Read(id) => read(app, id).await,
        Command::Assignment(id) => assignment(app, id).await,
        Command::Answer {
            assignment,
            question,
            choice,
        } => {
            let progress = app
                .assignments()
                .record_answer(assignment, question, choice)
                .await?;
            println!("Saved, {} answered", progress.answered());
        }
        Command::Submit(id) => submit(app, id).await,
        Command::Dashboard(window) => dashboard(app, window).await?,
        Command::Recommend => recommend(app).await?,
        Command::History(filter) => history(app, filter).await?,
    }
    Ok(())
}

async fn whoami(app: &AppServices, restored: Option<UserSession>) {
    let Some(session) = restored.filter(|s| s.is_logged_in()) else {
        println!("Not signed in");
        return;
    };
    let name = session.display_name().unwrap_or_default();
    let email = session.email.unwrap_or_default();
    println!("{name} <{email}>");
    if app.context().is_session_alive().await {
        println!("Session is active at {}", app.context().base_url());
    } else {
        println!("Session has expired, sign in again");
    }
}

fn search_with(app: &AppServices, filters: &FilterState) -> QuestionSearch {
    let mut search = app.question_search();
    for facet in Facet::ALL {
        search.select(facet, filters.get(facet).map(str::to_owned));
    }
    search.set_query(&filters.query);
    search
}

async fn questions(app: &AppServices, filters: FilterState, pages: u32) -> CommandResult {
    let mut search = search_with(app, &filters);
    let update = search.apply().await?;
    for facet in &update.cleared {
        println!("({} selection no longer matches, cleared)", facet.as_str());
    }
    for _ in 1..pages {
        if search.load_next_page().await?.loaded == 0 {
            break;
        }
    }

    for item in search.items() {
        let facets = Facet::ALL
            .iter()
            .filter_map(|f| item.facets.value(*f))
            .collect::<Vec<_>>()
            .join(" / ");
        println!("{}\t{}\t[{}]", item.id, item.question, facets);
    }
    println!(
        "{} of {} questions, page {}",
        search.items().len(),
        search.total_count(),
        search.page()
    );
    Ok(())
}

async fn practice(app: &AppServices, id: QuestionId, choice: Option<usize>) -> CommandResult {
    let practice = app.practice();
    let question = practice.load(id).await?;
    println!("{}", question.question);
    for (i, text) in question.choices.iter().enumerate() {
        println!("  {i}. {text}");
    }

    let Some(choice) = choice else {
        return Ok(());
    };
    let feedback = practice.answer(&question, choice).await;
    if feedback.correct {
        println!("Correct!");
    } else {
        match feedback.correct_choice {
            Some(text) => println!("Wrong, the answer is: {text}"),
            None => println!("Wrong"),
        }
    }
    if !feedback.recorded {
        println!("(the attempt could not be recorded)");
    }
    Ok(())
}

async fn class(app: &AppServices, clock: Clock, id: ClassId) -> CommandResult {
    let detail = app.classes().class_assignments(id).await?;
    println!("{} ({})", detail.class_name, detail.class_id);
    let now = clock.local_now();
    for item in &detail.assignments {
        let progress = app.assignments().get_progress(item.assignment_id).await;
        let status = AssignmentStatus::of(item, now, &progress);
        let due = item
            .expire_time
            .as_ref()
            .map(|t| t.display())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "no deadline".to_owned());
        println!(
            "{}\t{}\tdue {}\t{}",
            item.assignment_id,
            item.assignment_name,
            due,
            status.label()
        );
    }
    Ok(())
}

async fn join(app: &AppServices, key: JoinKey) -> CommandResult {
    match app.classes().join_class(key).await? {
        JoinOutcome::Joined { message } | JoinOutcome::Rejected { message, .. } => {
            println!("{message}");
        }
    }
    Ok(())
}

async fn announcements(app: &AppServices, class: Option<ClassId>) {
    let service = app.announcements();
    let joined = service.joined_classes().await;
    let list = service.announcements(&joined, class).await;
    if list.is_empty() {
        println!("No announcements");
        return;
    }
    for item in list {
        let id = item
            .announcement_id
            .map_or_else(|| "-".to_owned(), |id| id.to_string());
        let marker = if item.is_read() { " " } else { "*" };
        println!(
            "{marker} {id}\t{}\t{}\t{}",
            item.create_time.display(),
            item.class_name.unwrap_or_default(),
            item.title
        );
        if !item.content.trim().is_empty() {
            println!("    {}", item.content.trim());
        }
    }
}

async fn read(app: &AppServices, id: AnnouncementId) {
    match app.announcements().mark_read(id).await {
        MarkRead::Sent { acknowledged: true } => println!("Marked as read"),
        MarkRead::Sent { acknowledged: false } => println!("The announcement was not updated"),
        MarkRead::InFlight => println!("Already being marked"),
    }
}

async fn assignment(app: &AppServices, id: AssignmentId) {
    let service = app.assignments();
    let questions = service.assignment_questions(id).await;
    let progress = service.get_progress(id).await;
    for question in &questions {
        let chosen = progress.answer(question.id);
        println!("{}\t{}", question.id, question.question);
        for (i, text) in question.choices.iter().enumerate() {
            let mark = if chosen == i32::try_from(i).ok() { ">" } else { " " };
            println!("  {mark} {i}. {text}");
        }
    }
    let completion = service.completion(id, questions.len()).await;
    println!(
        "{} of {} answered{}",
        completion.answered,
        completion.total,
        if progress.is_completed() { ", submitted" } else { "" }
    );
}

async fn submit(app: &AppServices, id: AssignmentId) {
    let service = app.assignments();
    let questions = service.assignment_questions(id).await;
    if questions.is_empty() {
        println!("No questions to submit");
        return;
    }
    match service.submit(id, &questions).await {
        SubmissionOutcome::Incomplete { answered, total } => {
            println!("Answer every question first ({answered} of {total} answered)");
        }
        SubmissionOutcome::Submitted(result) => println!(
            "Submitted: {} of {} correct, accuracy {:.2}%",
            result.correct, result.total, result.accuracy
        ),
        SubmissionOutcome::Rejected { result, message } => println!(
            "{message} ({} of {} correct, accuracy {:.2}%)",
            result.correct, result.total, result.accuracy
        ),
        SubmissionOutcome::Failed { reason, .. } => {
            println!("Submission failed: {reason}");
        }
    }
}

async fn dashboard(app: &AppServices, window: DayWindow) -> CommandResult {
    let series = app.dashboard().accuracy_rates().await?;
    if series.is_empty() {
        println!("No answers recorded yet");
        return Ok(());
    }
    for (day, percent) in series.window(window) {
        println!("day {day}\t{percent:.2}%");
    }
    Ok(())
}

async fn recommend(app: &AppServices) -> CommandResult {
    let service = app.recommendations();
    let ids = service.recommended_ids().await?;
    let mut practice = pin!(service.practice_stream(ids));
    while let Some(item) = practice.next().await {
        println!("{}\t{}", item.id, item.title);
    }
    Ok(())
}

async fn history(app: &AppServices, filter: HistoryFilter) -> CommandResult {
    let service = app.history();
    let records = filter.apply(&service.answer_history().await?);
    if records.is_empty() {
        println!("No answers yet");
        return Ok(());
    }
    let mut enriched = pin!(service.enrich(records));
    while let Some(record) = enriched.next().await {
        let verdict = if record.correct { "correct" } else { "wrong" };
        let title = record
            .title
            .unwrap_or_else(|| format!("Question #{}", record.question_id));
        println!("{}\t{verdict}\t{title}", record.question_id);
    }
    Ok(())
}
