use super::*;
use crate::{
    memory_gateway::Snapshot,
    test_support::{Call, RecordingGateway},
};
use shared::domain::Presence;

fn user() -> CurrentUser {
    CurrentUser {
        username: "alice".to_string(),
        photo_url: Some("https://example.test/alice.png".to_string()),
    }
}

fn worker(name: &str, slice: Slice) -> OfficeWorker {
    OfficeWorker::new(name, None, slice)
}

fn office_with(day: Weekday, workers: Vec<OfficeWorker>) -> Office {
    Office {
        id: OfficeId::new("paris"),
        name: "Paris".to_string(),
        presence: [(day, workers)].into_iter().collect::<Presence>(),
    }
}

fn controller(gateway: Arc<RecordingGateway>) -> (PresenceController, Notifier) {
    let notifier = Notifier::new();
    (
        PresenceController::new(gateway, notifier.clone(), user()),
        notifier,
    )
}

#[test]
fn day_presence_slices_are_disjoint_and_cover_the_list() {
    let workers = vec![
        worker("alice", Slice::FullDay),
        worker("bob", Slice::Morning),
        worker("carol", Slice::Afternoon),
        worker("dave", Slice::FullDay),
        worker("bob", Slice::Afternoon),
    ];
    let day = DayPresence::from_workers(&workers);

    assert_eq!(day.full_day.len(), 2);
    assert_eq!(day.morning, vec![worker("bob", Slice::Morning)]);
    assert_eq!(
        day.afternoon,
        vec![worker("carol", Slice::Afternoon), worker("bob", Slice::Afternoon)]
    );

    let union: Vec<&OfficeWorker> = Slice::ALL
        .into_iter()
        .flat_map(|slice| day.slice(slice).iter())
        .collect();
    assert_eq!(union.len(), workers.len());
    for w in &workers {
        let hits = Slice::ALL
            .into_iter()
            .filter(|slice| day.slice(*slice).contains(w))
            .count();
        assert_eq!(hits, 1, "{w:?} must be in exactly one slice");
    }
}

#[test]
fn day_presence_skips_entries_without_any_half_day() {
    let stray = OfficeWorker {
        name: "ghost".to_string(),
        photo_url: None,
        on_morning: false,
        on_afternoon: false,
    };
    let day = DayPresence::from_workers(&[stray]);
    assert_eq!(day, DayPresence::default());
}

#[test]
fn presence_board_covers_every_weekday_with_headcount() {
    let office = office_with(
        Weekday::Wednesday,
        vec![worker("alice", Slice::FullDay), worker("bob", Slice::Morning)],
    );
    let board = PresenceBoard::new(&[office]);

    assert_eq!(board.days.len(), Weekday::ALL.len());
    let wednesday = board
        .days
        .iter()
        .find(|view| view.day == Weekday::Wednesday)
        .expect("wednesday");
    assert_eq!(wednesday.offices[0].headcount, 2);
    let monday = &board.days[0];
    assert_eq!(monday.day, Weekday::Monday);
    assert_eq!(monday.offices[0].headcount, 0);
    assert_eq!(monday.offices[0].slices, DayPresence::default());
}

#[test]
fn empty_office_list_yields_empty_board() {
    assert!(PresenceBoard::new(&[]).is_empty());
}

#[test]
fn plan_toggle_adds_when_user_absent_from_slice() {
    let office = office_with(Weekday::Monday, vec![worker("alice", Slice::Morning)]);
    let change = plan_toggle(&office, Weekday::Monday, &user(), Slice::FullDay);
    assert_eq!(
        change,
        PresenceChange::Add {
            office_id: OfficeId::new("paris"),
            day: Weekday::Monday,
            person: OfficeWorker::new("alice", user().photo_url, Slice::FullDay),
        }
    );
}

#[test]
fn plan_toggle_removes_exact_slice_match() {
    let office = office_with(Weekday::Monday, vec![worker("alice", Slice::Morning)]);
    let change = plan_toggle(&office, Weekday::Monday, &user(), Slice::Morning);
    assert!(matches!(change, PresenceChange::Remove { .. }));
}

#[test]
fn plan_toggle_ignores_other_people_in_same_slice() {
    let office = office_with(Weekday::Monday, vec![worker("bob", Slice::Afternoon)]);
    let change = plan_toggle(&office, Weekday::Monday, &user(), Slice::Afternoon);
    assert!(matches!(change, PresenceChange::Add { .. }));
}

#[tokio::test]
async fn toggling_twice_restores_the_slice() {
    let gateway = RecordingGateway::new(Snapshot {
        offices: vec![office_with(Weekday::Tuesday, vec![worker("bob", Slice::Morning)])],
        ..Snapshot::default()
    });
    let (controller, _notifier) = controller(gateway.clone());

    for slice in Slice::ALL {
        let before = controller.offices().await.expect("offices")[0].clone();
        let original = DayPresence::from_workers(before.presence.day(Weekday::Tuesday));

        let first = controller
            .toggle(&before, Weekday::Tuesday, slice)
            .await
            .expect("first toggle");
        assert!(matches!(first, PresenceChange::Add { .. }));

        let after_add = controller.offices().await.expect("offices")[0].clone();
        let second = controller
            .toggle(&after_add, Weekday::Tuesday, slice)
            .await
            .expect("second toggle");
        assert!(matches!(second, PresenceChange::Remove { .. }));

        let after = controller.offices().await.expect("offices")[0].clone();
        assert_eq!(
            DayPresence::from_workers(after.presence.day(Weekday::Tuesday)),
            original
        );
    }
    assert_eq!(gateway.calls().await.len(), 6);
}

#[tokio::test]
async fn toggle_publishes_success_notification() {
    let gateway = RecordingGateway::new(Snapshot {
        offices: vec![office_with(Weekday::Friday, Vec::new())],
        ..Snapshot::default()
    });
    let (controller, notifier) = controller(gateway);
    let mut toasts = notifier.subscribe();
    let office = controller.offices().await.expect("offices")[0].clone();

    controller
        .toggle(&office, Weekday::Friday, Slice::Morning)
        .await
        .expect("toggle");

    let toast = toasts.try_recv().expect("toast");
    assert!(toast.title.contains("VENDREDI"));
}

#[tokio::test]
async fn failed_toggle_propagates_and_stays_silent() {
    let gateway = RecordingGateway::new(Snapshot::default());
    let (controller, notifier) = controller(gateway);
    let mut toasts = notifier.subscribe();
    let orphan = office_with(Weekday::Monday, Vec::new());

    controller
        .toggle(&orphan, Weekday::Monday, Slice::FullDay)
        .await
        .expect_err("office is not stored");
    assert!(toasts.try_recv().is_err());
}

#[tokio::test]
async fn cancelled_clear_issues_no_mutation() {
    let offices = vec![office_with(Weekday::Monday, vec![worker("bob", Slice::FullDay)])];
    let gateway = RecordingGateway::new(Snapshot {
        offices: offices.clone(),
        ..Snapshot::default()
    });
    let (controller, _notifier) = controller(gateway.clone());

    controller.request_clear_all().cancel();

    assert!(gateway.calls().await.is_empty());
    assert_eq!(controller.offices().await.expect("offices"), offices);
}

#[tokio::test]
async fn confirmed_clear_issues_exactly_one_mutation() {
    let gateway = RecordingGateway::new(Snapshot {
        offices: vec![office_with(Weekday::Monday, vec![worker("bob", Slice::FullDay)])],
        ..Snapshot::default()
    });
    let (controller, _notifier) = controller(gateway.clone());

    controller
        .request_clear_all()
        .confirm()
        .await
        .expect("clear");

    assert_eq!(gateway.calls().await, vec![Call::ClearAllPresence]);
    let offices = controller.offices().await.expect("offices");
    assert!(offices[0].presence.is_empty());
}

#[tokio::test]
async fn blank_office_name_is_ignored() {
    let gateway = RecordingGateway::new(Snapshot::default());
    let (controller, _notifier) = controller(gateway.clone());

    assert_eq!(controller.add_office("   ").await.expect("add"), None);
    let created = controller
        .add_office(" Lyon ")
        .await
        .expect("add")
        .expect("created");
    assert_eq!(created.name, "Lyon");
    assert_eq!(gateway.calls().await, vec![Call::AddOffice("Lyon".to_string())]);

    controller.delete_office(&created.id).await.expect("delete");
    assert!(controller.offices().await.expect("offices").is_empty());
}
