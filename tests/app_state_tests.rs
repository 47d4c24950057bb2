//! Application state tests
//!
//! Listing, command building, run lifecycle and output handling driven
//! through [`App`] against a recording spawner.

mod common;

use common::{create_test_app, mounted_app, FakeSpawner};
use pbrun::spawn::ExecutionStatus;
use pbrun::ui::app::{FocusField, StatusLevel};

const PLAYBOOKS: &str = "deploy.yml\nREADME.md\nsite.yml\nbackup.yaml\n";
const IMAGES: &str = "quay.io/ansible/creator-ee\n\n   \nlocalhost/envimg\n\n";

#[test]
fn test_mount_lists_playbooks_and_images() {
    let spawner = FakeSpawner::new(PLAYBOOKS, IMAGES);
    let app = mounted_app(&spawner);

    assert_eq!(app.playbooks, vec!["deploy.yml", "site.yml", "backup.yaml"]);
    assert_eq!(app.selected_playbook, Some(0));
    assert_eq!(app.images, vec!["quay.io/ansible/creator-ee", "localhost/envimg"]);
    assert_eq!(app.selected_image, Some(0));

    assert_eq!(
        spawner.captured_lines(),
        vec![
            "ls -1 -- /opt/playbooks".to_string(),
            "podman image list --filter label=ansible_execution_environment --noheading --format \"table {{.Repository}}\"".to_string(),
        ]
    );
}

#[test]
fn test_listing_with_trailing_newline_yields_n_options_in_order() {
    let spawner = FakeSpawner::new("c.yml\na.yml\nb.yaml\n", "");
    let app = mounted_app(&spawner);

    assert_eq!(app.playbooks.len(), 3);
    assert_eq!(app.playbooks, vec!["c.yml", "a.yml", "b.yaml"]);
}

#[test]
fn test_blank_image_lines_are_dropped() {
    let spawner = FakeSpawner::new("", "\n a \n\n\t\nb\n  \nc\n");
    let app = mounted_app(&spawner);

    assert_eq!(app.images, vec!["a", "b", "c"]);
}

#[test]
fn test_load_playbooks_from_new_folder() {
    let spawner = FakeSpawner::new(PLAYBOOKS, IMAGES);
    let mut app = mounted_app(&spawner);

    spawner.set_playbook_listing(Ok("web.yml\n"));
    app.folder_input = "/srv/ansible/".to_string();
    app.load_playbooks(&spawner);

    assert_eq!(app.playbook_folder, "/srv/ansible/");
    assert_eq!(app.playbooks, vec!["web.yml"]);
    assert_eq!(
        spawner.captured_lines().last().map(String::as_str),
        Some("ls -1 -- /srv/ansible/")
    );
}

#[test]
fn test_empty_folder_input_falls_back_to_default() {
    let spawner = FakeSpawner::new(PLAYBOOKS, IMAGES);
    let mut app = mounted_app(&spawner);

    app.folder_input = "   ".to_string();
    app.load_playbooks(&spawner);

    assert_eq!(app.playbook_folder, "/opt/playbooks");
    assert_eq!(app.folder_input, "/opt/playbooks");
}

#[test]
fn test_failed_playbook_listing_leaves_empty_list() {
    let spawner = FakeSpawner::new(PLAYBOOKS, IMAGES);
    let mut app = mounted_app(&spawner);
    assert_eq!(app.playbooks.len(), 3);

    spawner.set_playbook_listing(Err("ls: cannot access '/nope': No such file or directory"));
    app.folder_input = "/nope".to_string();
    app.load_playbooks(&spawner);

    assert!(app.playbooks.is_empty());
    assert_eq!(app.selected_playbook, None);
    let status = app.status_message.expect("status message");
    assert_eq!(status.level, StatusLevel::Error);
    assert!(status.text.contains("No such file or directory"));
}

#[test]
fn test_failed_image_listing_keeps_previous_list() {
    let spawner = FakeSpawner::new(PLAYBOOKS, IMAGES);
    let mut app = mounted_app(&spawner);
    app.select_next_image();

    spawner.set_image_listing(Err("podman: command not found"));
    app.load_images(&spawner);

    assert_eq!(app.images, vec!["quay.io/ansible/creator-ee", "localhost/envimg"]);
    assert_eq!(app.selected_image_name(), Some("localhost/envimg"));
}

#[test]
fn test_failed_image_listing_on_mount_is_empty() {
    let spawner = FakeSpawner::new(PLAYBOOKS, "");
    spawner.set_image_listing(Err("podman: command not found"));
    let app = mounted_app(&spawner);

    assert!(app.images.is_empty());
    assert_eq!(app.selected_image, None);
    assert_eq!(app.playbooks.len(), 3);
}

#[test]
fn test_reload_keeps_selected_image_by_name() {
    let spawner = FakeSpawner::new(PLAYBOOKS, IMAGES);
    let mut app = mounted_app(&spawner);
    app.select_next_image();
    assert_eq!(app.selected_image_name(), Some("localhost/envimg"));

    spawner.set_image_listing(Ok("localhost/other\nlocalhost/envimg\n"));
    app.reload(&spawner);

    assert_eq!(app.selected_image_name(), Some("localhost/envimg"));
}

#[test]
fn test_container_run_command() {
    let spawner = FakeSpawner::new("site.yml\n", "envimg\n");
    let mut app = mounted_app(&spawner);
    app.extra_args = "-v".to_string();
    app.run_in_container = true;

    assert!(app.submit(&spawner, 80, 24));
    assert_eq!(
        spawner.streamed_lines(),
        vec![
            "podman container runlabel ansible_execution_environment envimg \"/opt/playbooks/site.yml -v\""
                .to_string()
        ]
    );
}

#[test]
fn test_host_run_command() {
    let spawner = FakeSpawner::new("site.yml\n", "envimg\n");
    let mut app = mounted_app(&spawner);
    app.extra_args = "-v".to_string();

    assert!(app.submit(&spawner, 80, 24));
    assert_eq!(
        spawner.streamed_lines(),
        vec!["systemd-run --quiet --scope ansible-playbook /opt/playbooks/site.yml -v".to_string()]
    );
}

#[test]
fn test_host_run_splits_quoted_extra_args() {
    let spawner = FakeSpawner::new("site.yml\n", "");
    let mut app = mounted_app(&spawner);
    app.extra_args = "-e 'target=web servers' --check".to_string();

    assert!(app.submit(&spawner, 80, 24));
    let streamed = spawner.streamed.lock().unwrap();
    assert_eq!(
        streamed[0].args[4..],
        ["-e", "target=web servers", "--check"]
    );
}

#[test]
fn test_submit_without_playbook_invokes_nothing() {
    let spawner = FakeSpawner::new("", "envimg\n");
    let mut app = mounted_app(&spawner);
    let captured_before = spawner.captured_lines().len();

    assert!(!app.submit(&spawner, 80, 24));

    assert!(spawner.streamed_lines().is_empty());
    assert_eq!(spawner.captured_lines().len(), captured_before);
    assert_eq!(app.run_status, ExecutionStatus::Idle);
    assert!(app.output.contents().trim().is_empty());
}

#[test]
fn test_container_run_without_image_fails_before_spawning() {
    let spawner = FakeSpawner::new("site.yml\n", "");
    let mut app = mounted_app(&spawner);
    app.run_in_container = true;

    assert!(!app.submit(&spawner, 80, 24));

    assert!(spawner.streamed_lines().is_empty());
    assert_eq!(app.run_status, ExecutionStatus::Failed);
    assert!(app
        .output
        .contents()
        .contains("Error executing playbook: No container image selected"));
}

#[test]
fn test_chunks_are_appended_in_arrival_order() {
    let spawner = FakeSpawner::new("site.yml\n", "").with_chunks(&[
        "PLAY [all] ***\r\n",
        "TASK [ping] ",
        "***\r\nok: [web1]\r\n",
        "PLAY RECAP ***\r\n",
    ]);
    let mut app = mounted_app(&spawner);

    assert!(app.submit(&spawner, 80, 24));

    let contents = app.output.contents();
    let banner = contents.find("$ systemd-run").expect("banner");
    let play = contents.find("PLAY [all]").expect("play");
    let task = contents.find("TASK [ping] ***").expect("task");
    let ok = contents.find("ok: [web1]").expect("ok");
    let recap = contents.find("PLAY RECAP").expect("recap");
    assert!(banner < play && play < task && task < ok && ok < recap);
}

#[test]
fn test_markup_in_output_is_plain_text() {
    let spawner =
        FakeSpawner::new("site.yml\n", "").with_chunks(&["<script>alert(1)</script>\r\n"]);
    let mut app = mounted_app(&spawner);

    app.submit(&spawner, 80, 24);

    assert!(app.output.contents().contains("<script>alert(1)</script>"));
}

#[test]
fn test_successful_run_lifecycle() {
    let spawner = FakeSpawner::new("site.yml\n", "").with_chunks(&["ok\r\n"]);
    let mut app = mounted_app(&spawner);

    assert!(app.submit(&spawner, 80, 24));
    assert!(app.is_running());
    assert_eq!(app.run_status, ExecutionStatus::Running);
    assert_eq!(app.focus, FocusField::Output);
    assert_eq!(app.poll_run(), None);

    spawner.reporter(0).finish(0);

    assert_eq!(app.poll_run(), Some(ExecutionStatus::Succeeded));
    assert!(app.run.is_none());
    assert!(!app.is_running());
    let contents = app.output.contents();
    assert!(contents.contains("ok"));
    assert!(contents.contains("Playbook execution complete"));
}

#[test]
fn test_failed_run_reports_exit_code() {
    let spawner = FakeSpawner::new("site.yml\n", "");
    let mut app = mounted_app(&spawner);

    app.submit(&spawner, 80, 24);
    spawner.reporter(0).finish(2);

    assert_eq!(app.poll_run(), Some(ExecutionStatus::Failed));
    assert!(app
        .output
        .contents()
        .contains("Error executing playbook: exited with code 2"));
    assert_eq!(
        app.status_message.map(|m| m.level),
        Some(StatusLevel::Error)
    );
}

#[test]
fn test_spawn_failure_appends_error() {
    let spawner =
        FakeSpawner::new("site.yml\n", "").with_stream_error("Failed to spawn command: systemd-run");
    let mut app = mounted_app(&spawner);

    assert!(!app.submit(&spawner, 80, 24));

    assert!(app.run.is_none());
    assert_eq!(app.run_status, ExecutionStatus::Failed);
    assert!(app
        .output
        .contents()
        .contains("Error executing playbook: Failed to spawn command: systemd-run"));
}

#[test]
fn test_submit_while_running_is_refused() {
    let spawner = FakeSpawner::new("site.yml\n", "").with_chunks(&["first run\r\n"]);
    let mut app = mounted_app(&spawner);

    assert!(app.submit(&spawner, 80, 24));
    assert!(!app.submit(&spawner, 80, 24));

    assert_eq!(spawner.streamed_lines().len(), 1);
    assert!(app.output.contents().contains("first run"));
    assert_eq!(
        app.status_message.as_ref().map(|m| m.level),
        Some(StatusLevel::Warning)
    );
}

#[test]
fn test_second_run_clears_previous_output() {
    let spawner = FakeSpawner::new("site.yml\n", "").with_chunks(&["chunk\r\n"]);
    let mut app = mounted_app(&spawner);

    app.submit(&spawner, 80, 24);
    spawner.reporter(0).finish(0);
    app.poll_run();
    assert!(app.output.contents().contains("Playbook execution complete"));

    assert!(app.submit(&spawner, 80, 24));
    assert!(!app.output.contents().contains("Playbook execution complete"));
}

#[test]
fn test_cancel_run() {
    let spawner = FakeSpawner::new("site.yml\n", "");
    let mut app = mounted_app(&spawner);

    app.submit(&spawner, 80, 24);
    app.cancel_run();
    assert!(app.run.as_ref().is_some_and(|r| r.cancel_requested()));
    assert!(app.is_running(), "still running until the child exits");

    spawner.reporter(0).finish(143);

    assert_eq!(app.poll_run(), Some(ExecutionStatus::Cancelled));
    assert!(app.output.contents().contains("Playbook run cancelled"));
}

#[test]
fn test_shutdown_cancels_running_playbook() {
    let spawner = FakeSpawner::new("site.yml\n", "");
    let mut app = mounted_app(&spawner);

    app.submit(&spawner, 80, 24);
    app.shutdown();

    assert!(app.run.as_ref().is_some_and(|r| r.cancel_requested()));
}

#[test]
fn test_output_is_bounded() {
    let mut app = create_test_app();
    app.output.reset(10, 40);

    for i in 0..5_000 {
        app.output.append_line(&format!("line {}", i));
    }

    assert!(app.output.max_scrollback() <= 1_000);
    let contents = app.output.contents();
    assert!(contents.contains("line 4999"));
}
