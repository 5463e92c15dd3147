//! Integration tests for the board client.
//!
//! The same flows run against the offline transport and a live HTTP server.

use kanban_board::api::{ServerHandle, start_server};
use kanban_board::client::{
    Board, ClientError, DialogMode, HttpTaskApi, LocalTaskApi, Reconcile, TaskApi,
};
use kanban_board::store::TaskStore;
use kanban_board::types::{NewTask, Status, TaskFilter, TaskPatch};
use std::net::SocketAddr;

async fn setup_server(store: TaskStore) -> ServerHandle {
    setup_server_at(store, SocketAddr::from(([127, 0, 0, 1], 0))).await
}

async fn setup_server_at(store: TaskStore, addr: SocketAddr) -> ServerHandle {
    start_server(store, addr)
        .await
        .expect("Failed to start server")
}

/// An address nothing listens on.
async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

mod offline_tests {
    use super::*;

    #[tokio::test]
    async fn create_through_dialog() {
        let mut board = Board::offline();
        board.refresh().await.unwrap();

        board.open_create();
        assert_eq!(board.dialog().mode(), Some(&DialogMode::Create));
        {
            let form = board.form_mut().unwrap();
            form.title = "Write launch article".into();
            form.assignee = "Ada".into();
        }

        let task = board.submit_dialog().await.unwrap();
        assert_eq!(task.status, Status::Idea);
        assert!(!board.dialog().is_open());
        assert_eq!(board.tasks(), &[task.clone()]);
        assert_eq!(board.columns()[0].tasks, vec![&task]);
        assert_eq!(board.last_error(), None);
    }

    #[tokio::test]
    async fn empty_title_never_reaches_the_store() {
        let mut board = Board::offline();
        board.open_create();
        board.form_mut().unwrap().title = "   ".into();

        let result = board.submit_dialog().await;
        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert!(board.dialog().is_open());
        assert!(board.api().store().is_empty());
        assert!(board.last_error().is_some());
    }

    #[tokio::test]
    async fn edit_prefills_and_updates() {
        let mut board = Board::offline();
        let task = board
            .api()
            .store()
            .create(NewTask::titled("Draft"))
            .unwrap();
        board.refresh().await.unwrap();

        assert!(board.open_edit(&task.id));
        assert_eq!(board.dialog().form().unwrap().title, "Draft");
        board.form_mut().unwrap().description = "Now with notes".into();

        let updated = board.submit_dialog().await.unwrap();
        assert_eq!(updated.id, task.id);
        assert_eq!(updated.description, "Now with notes");
        assert_eq!(board.task(&task.id).unwrap().description, "Now with notes");
    }

    #[tokio::test]
    async fn cancel_discards_form() {
        let mut board = Board::offline();
        board.open_create();
        board.form_mut().unwrap().title = "Abandoned".into();
        board.cancel_dialog();

        assert!(!board.dialog().is_open());
        assert!(board.api().store().is_empty());
    }

    #[tokio::test]
    async fn drag_to_other_column_updates_status() {
        let mut board = Board::offline();
        let task = board
            .api()
            .store()
            .create(NewTask::titled("Story"))
            .unwrap();
        board.refresh().await.unwrap();

        board.begin_drag(&task.id);
        let moved = board.drop_on(Status::Drafting).await.unwrap().unwrap();
        assert_eq!(moved.status, Status::Drafting);
        assert!(board.drag().is_idle());

        let columns = board.columns();
        assert!(columns[0].tasks.is_empty());
        assert_eq!(columns[2].status, Status::Drafting);
        assert_eq!(columns[2].tasks[0].id, task.id);
    }

    #[tokio::test]
    async fn drop_on_same_column_is_noop() {
        let mut board = Board::offline();
        let task = board
            .api()
            .store()
            .create(NewTask::titled("Story"))
            .unwrap();
        board.refresh().await.unwrap();

        board.begin_drag(&task.id);
        assert_eq!(board.drop_on(Status::Idea).await.unwrap(), None);
        // No update happened, so updatedAt is unchanged.
        assert_eq!(board.api().store().get(&task.id).unwrap(), task);
    }

    #[tokio::test]
    async fn release_outside_makes_no_request() {
        let mut board = Board::offline();
        let task = board
            .api()
            .store()
            .create(NewTask::titled("Story"))
            .unwrap();
        board.refresh().await.unwrap();

        board.begin_drag(&task.id);
        board.release_drag();
        assert!(board.drag().is_idle());
        assert_eq!(board.drop_on(Status::Published).await.unwrap(), None);
        assert_eq!(board.api().store().get(&task.id).unwrap(), task);
    }

    #[tokio::test]
    async fn delete_closes_edit_dialog() {
        let mut board = Board::offline();
        let task = board
            .api()
            .store()
            .create(NewTask::titled("Story"))
            .unwrap();
        board.refresh().await.unwrap();

        board.open_edit(&task.id);
        board.delete_task(&task.id).await.unwrap();
        assert!(!board.dialog().is_open());
        assert!(board.tasks().is_empty());

        let err = board.delete_task(&task.id).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(board.last_error().is_some());
    }

    #[tokio::test]
    async fn refetch_picks_up_changes_made_elsewhere() {
        let store = TaskStore::new();
        let mut board = Board::new(LocalTaskApi::new(store.clone()));
        let task = store.create(NewTask::titled("Mine")).unwrap();
        board.refresh().await.unwrap();

        store.create(NewTask::titled("Someone else's")).unwrap();

        board.begin_drag(&task.id);
        board.drop_on(Status::Assigned).await.unwrap();
        assert_eq!(board.tasks().len(), 2);
    }
}

mod http_tests {
    use super::*;

    #[tokio::test]
    async fn board_round_trip_over_http() {
        let server = setup_server(TaskStore::new()).await;
        let mut board = Board::new(HttpTaskApi::new(server.url()));
        board.refresh().await.unwrap();
        assert!(board.tasks().is_empty());

        board.open_create();
        board.form_mut().unwrap().title = "Write launch article".into();
        let task = board.submit_dialog().await.unwrap();

        board.begin_drag(&task.id);
        let moved = board.drop_on(Status::FactCheck).await.unwrap().unwrap();
        assert_eq!(moved.status, Status::FactCheck);
        assert!(moved.updated_at > task.updated_at);

        let remote = board
            .api()
            .list_tasks(&TaskFilter {
                status: Some("Fact-Check".into()),
                assignee: None,
            })
            .await
            .unwrap();
        assert_eq!(remote, vec![moved.clone()]);

        board.delete_task(&task.id).await.unwrap();
        assert!(board.tasks().is_empty());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn server_validation_errors_surface_with_message() {
        let server = setup_server(TaskStore::new()).await;
        let mut board = Board::new(HttpTaskApi::new(server.url()));

        board.open_create();
        {
            let form = board.form_mut().unwrap();
            form.title = "Dated".into();
            form.due_date = "2026-13-45".into();
        }
        let err = board.submit_dialog().await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("dueDate"));
        assert!(board.dialog().is_open());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn ids_with_reserved_characters_stay_one_path_segment() {
        let server = setup_server(TaskStore::new()).await;
        let api = HttpTaskApi::new(server.url());

        let err = api.delete_task("a/b?c#d").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Task not found: a/b?c#d"), "{}", err);

        let err = api
            .update_task("../api/health", &TaskPatch::status(Status::Editing))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Task not found"), "{}", err);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn statuses_match_over_http() {
        let server = setup_server(TaskStore::new()).await;
        let api = HttpTaskApi::new(server.url());
        assert_eq!(api.list_statuses().await.unwrap(), Status::names());
        server.shutdown().await;
    }

    #[tokio::test]
    async fn fetch_failure_preserves_last_known_good_list() {
        let store = TaskStore::new();
        let task = store.create(NewTask::titled("Survivor")).unwrap();
        let server = setup_server(store.clone()).await;

        let mut board = Board::new(HttpTaskApi::new(server.url()));
        board.refresh().await.unwrap();
        assert_eq!(board.tasks(), &[task.clone()]);

        let addr = server.addr();
        server.shutdown().await;

        let err = board.refresh().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert_eq!(board.tasks(), &[task.clone()]);
        assert!(board.last_error().is_some());

        // Retry succeeds once the server is back on the same address.
        let server = setup_server_at(store, addr).await;
        board.retry().await.unwrap();
        assert_eq!(board.tasks(), &[task]);
        assert_eq!(board.last_error(), None);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn mutation_failure_keeps_list_and_retry_recovers() {
        let mut board = Board::new(HttpTaskApi::new(dead_url().await))
            .with_reconcile(Reconcile::Merge);

        assert!(board.refresh().await.is_err());
        assert!(board.tasks().is_empty());

        board.open_create();
        board.form_mut().unwrap().title = "Offline draft".into();
        assert!(board.submit_dialog().await.is_err());
        assert!(board.dialog().is_open());
        assert!(board.tasks().is_empty());

        assert!(board.retry().await.is_err());
        assert!(board.last_error().is_some());
    }
}
