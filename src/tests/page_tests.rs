use super::*;
use crate::api::{ApiError, ApiResult};
use crate::model::PageEvent;
use crate::orchestrator::{run_controller, UiCommand};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// In-memory backend that counts calls and can be told to fail.
#[derive(Default)]
struct FakeApi {
    users: Mutex<Vec<User>>,
    list_calls: AtomicUsize,
    mutations: Mutex<Vec<String>>,
    fail_list: Mutex<bool>,
    fail_mutations: Mutex<bool>,
}

impl FakeApi {
    fn with_users(users: Vec<User>) -> Arc<Self> {
        Arc::new(Self {
            users: Mutex::new(users),
            ..Default::default()
        })
    }

    fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn check_mutation(&self, call: String) -> ApiResult<()> {
        self.mutations.lock().unwrap().push(call);
        if *self.fail_mutations.lock().unwrap() {
            Err(ApiError::MissingId)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserApi for FakeApi {
    async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_list.lock().unwrap() {
            return Err(ApiError::MissingId);
        }
        Ok(self.users.lock().unwrap().clone())
    }

    async fn create_user(&self, user: &User) -> ApiResult<()> {
        self.check_mutation(format!("create {}", user.email))?;
        let mut users = self.users.lock().unwrap();
        let mut created = user.clone();
        created.id = Some((users.len() + 1).to_string());
        users.push(created);
        Ok(())
    }

    async fn update_user(&self, user: &User) -> ApiResult<()> {
        self.check_mutation(format!("update {}", user.id.clone().unwrap_or_default()))?;
        let mut users = self.users.lock().unwrap();
        if let Some(slot) = users.iter_mut().find(|u| u.id == user.id) {
            *slot = user.clone();
        }
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> ApiResult<()> {
        self.check_mutation(format!("delete {id}"))?;
        self.users
            .lock()
            .unwrap()
            .retain(|u| u.id.as_deref() != Some(id));
        Ok(())
    }
}

fn user(id: &str, email: &str) -> User {
    User {
        id: Some(id.into()),
        first_name: "F".into(),
        last_name: "L".into(),
        phone: "1".into(),
        position: "Eng".into(),
        email: email.into(),
        password: "123456".into(),
    }
}

#[tokio::test]
async fn starts_loading_then_ready_after_load() {
    let api = FakeApi::with_users(vec![user("1", "a@x.com")]);
    let mut page = PageController::new(api.clone());
    assert_eq!(page.status(), &PageStatus::Loading);

    page.load().await;

    assert_eq!(page.status(), &PageStatus::Ready);
    assert_eq!(page.users().len(), 1);
    assert!(page.snapshot().refreshed_at.is_some());
    assert_eq!(api.list_calls(), 1);
}

#[tokio::test]
async fn failed_initial_fetch_shows_fixed_message_without_retry() {
    let api = FakeApi::with_users(vec![]);
    *api.fail_list.lock().unwrap() = true;
    let mut page = PageController::new(api.clone());

    page.load().await;

    assert_eq!(page.status(), &PageStatus::Failed(FETCH_FAILED.into()));
    assert_eq!(api.list_calls(), 1);
}

#[tokio::test]
async fn each_successful_mutation_refetches_exactly_once() {
    let api = FakeApi::with_users(vec![user("1", "a@x.com")]);
    let mut page = PageController::new(api.clone());
    page.load().await;

    let mut new_user = user("", "b@x.com");
    new_user.id = None;
    page.create(new_user).await;
    assert_eq!(api.list_calls(), 2);
    assert_eq!(page.users().len(), 2);

    let mut changed = user("1", "a@x.com");
    changed.position = "Lead".into();
    page.update(changed).await;
    assert_eq!(api.list_calls(), 3);
    assert_eq!(page.users()[0].position, "Lead");

    page.delete("1".into()).await;
    assert_eq!(api.list_calls(), 4);
    assert_eq!(page.users().len(), 1);
    assert_eq!(page.status(), &PageStatus::Ready);
    assert_eq!(
        *api.mutations.lock().unwrap(),
        ["create b@x.com", "update 1", "delete 1"]
    );
}

#[tokio::test]
async fn failed_mutation_still_refetches_and_keeps_its_own_message() {
    let api = FakeApi::with_users(vec![user("1", "a@x.com")]);
    let mut page = PageController::new(api.clone());
    page.load().await;
    *api.fail_mutations.lock().unwrap() = true;

    page.delete("1".into()).await;
    assert_eq!(api.list_calls(), 2);
    assert_eq!(page.status(), &PageStatus::Failed(DELETE_FAILED.into()));

    page.create(user("9", "z@x.com")).await;
    assert_eq!(page.status(), &PageStatus::Failed(CREATE_FAILED.into()));

    page.update(user("1", "a@x.com")).await;
    assert_eq!(page.status(), &PageStatus::Failed(UPDATE_FAILED.into()));
    assert_eq!(api.list_calls(), 4);
}

#[tokio::test]
async fn apply_routes_each_intent_to_its_request() {
    let api = FakeApi::with_users(vec![user("1", "a@x.com"), user("2", "b@x.com")]);
    let mut page = PageController::new(api.clone());
    page.load().await;

    let mut fresh = user("", "c@x.com");
    fresh.id = None;
    page.apply(Intent::Create(fresh)).await;
    page.apply(Intent::Update(user("2", "bee@x.com"))).await;
    page.apply(Intent::Delete("1".into())).await;

    assert_eq!(
        *api.mutations.lock().unwrap(),
        ["create c@x.com", "update 2", "delete 1"]
    );
    assert_eq!(api.list_calls(), 4);
    let emails: Vec<_> = page.users().iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, ["bee@x.com", "c@x.com"]);
}

#[tokio::test]
async fn controller_loads_on_start_and_publishes_after_each_command() {
    let api = FakeApi::with_users(vec![user("1", "a@x.com")]);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run_controller(api.clone(), event_tx, cmd_rx));

    cmd_tx.send(Intent::Delete("1".into()).into()).unwrap();
    cmd_tx.send(UiCommand::Quit).unwrap();
    handle.await.unwrap().unwrap();

    let mut snapshots = Vec::new();
    while let Ok(ev) = event_rx.try_recv() {
        if let PageEvent::Snapshot(s) = ev {
            snapshots.push(s);
        }
    }
    assert_eq!(snapshots.len(), 3);
    assert_eq!(snapshots[0].status, PageStatus::Loading);
    assert_eq!(snapshots[1].users.len(), 1);
    assert!(snapshots[2].users.is_empty());
    assert_eq!(api.list_calls(), 2);
}

#[tokio::test]
async fn controller_stops_when_command_channel_closes() {
    let api = FakeApi::with_users(vec![]);
    let (event_tx, _event_rx) = mpsc::unbounded_channel();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();
    drop(cmd_tx);

    run_controller(api.clone(), event_tx, cmd_rx).await.unwrap();

    assert_eq!(api.list_calls(), 1);
}
