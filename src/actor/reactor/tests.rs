use pretty_assertions::assert_eq;
use serde_json::json;
use test_log::test;

use super::testing::*;
use super::*;
use crate::layout_engine::{LayoutAction, LayoutKind, WindowMode};
use crate::model::ids::{GroupId, WindowId};
use crate::sys::headless::HeadlessHost;

fn group(raw: i64) -> GroupId { GroupId::new(raw).unwrap() }

fn id_of(harness: &Harness, raw: u64) -> WindowId {
    harness.reactor.engine().unwrap().window_id(window(raw)).unwrap()
}

#[test]
fn startup_registers_the_command_catalogue() {
    let mut config = Config::default();
    config.bindings.insert("rotate".to_string(), "Meta+O".to_string());
    config.bindings.insert("teleport".to_string(), "Meta+X".to_string());
    let harness = Harness::new(config);

    assert_eq!(harness.host.shortcuts().len(), commands::CATALOGUE.len());
    assert_eq!(harness.host.shortcut("rotate").unwrap().keybinding, "Meta+O");
    assert_eq!(harness.host.shortcut("swap_group_3_surface").unwrap().keybinding, "Meta+Shift+3");
    assert!(harness.host.shortcut("teleport").is_none());
}

#[test]
fn group_scenario_through_commands() {
    let mut h = Harness::new(Config::default());
    h.add(1, 0);
    h.add(2, 0);
    let (id1, id2) = (id_of(&h, 1), id_of(&h, 2));
    assert_eq!(h.reactor.window_list(), vec![id1, id2]);
    assert_eq!(h.store.window_list(), vec![id1, id2]);

    h.command("swap_group_3_surface");
    assert_eq!(h.store.surface_group(ORIGIN), Some(group(3)));
    assert_eq!(h.host.notifications(), vec!["Group 3".to_string()]);
    assert!(h.host.arrangement(ORIGIN).unwrap().tiled.is_empty());

    h.focus(1);
    h.command("change_window_group_3");
    assert_eq!(h.store.surface_group(ORIGIN), Some(group(3)));
    assert_eq!(h.host.arrangement(ORIGIN).unwrap().tiled, vec![window(1)]);
    assert_eq!(h.store.window_state(id1)["group"], json!(3));

    h.send(Event::WindowRemoved(window(1)));
    h.send(Event::WindowRemoved(window(1)));
    assert_eq!(h.store.window_list(), vec![id2]);
    assert_eq!(h.store.window_state(id1)["group"], json!(3));
}

#[test]
fn focus_commands_follow_the_window_list() {
    let mut h = Harness::new(Config::default());
    for raw in 1..=3 {
        h.add(raw, 0);
    }
    h.focus(3);
    h.command("focus_next_window");
    assert_eq!(h.host.active_window(), Some(window(1)));
    h.command("focus_prev_window");
    assert_eq!(h.host.active_window(), Some(window(3)));

    h.command("move_window_to_prev_pos");
    let order: Vec<_> = h.reactor.windows(None).into_iter().map(|w| w.handle).collect();
    assert_eq!(order, vec![window(1), window(3), window(2)]);
}

#[test]
fn layout_commands_cycle_and_forward_actions() {
    let mut h = Harness::new(Config::default());
    h.add(1, 0);
    h.focus(1);
    for _ in 0..LayoutKind::default_order().len() {
        h.command("next_layout");
    }
    assert_eq!(h.host.arrangement(ORIGIN).unwrap().layout, LayoutKind::Tile);
    assert_eq!(h.host.notifications().last().map(String::as_str), Some("tile"));

    h.command("toggle_monocle_layout");
    assert_eq!(h.host.arrangement(ORIGIN).unwrap().layout, LayoutKind::Monocle);
    assert_eq!(h.store.layout_state(ORIGIN)["layout"], json!("monocle"));

    h.command("increase_master_win_count");
    let request = h.host.layout_requests().pop().unwrap();
    assert_eq!(request.action, LayoutAction::IncreaseMasterCount);
    assert_eq!(request.layout, LayoutKind::Monocle);
    assert_eq!(request.window, Some(window(1)));
}

#[test]
fn unknown_commands_are_ignored() {
    let mut h = Harness::new(Config::default());
    h.add(1, 0);
    let before = h.host.arrangements();
    h.command("swap_group_21_surface");
    assert_eq!(h.host.arrangements(), before);
}

#[test]
fn window_lifecycle_events_change_modes() {
    let mut h = Harness::new(Config::default());
    h.add(1, 0);
    h.add(2, 0);

    h.send(Event::WindowMaximized { handle: window(1), horizontal: true, vertical: true });
    let arrangement = h.host.arrangement(ORIGIN).unwrap();
    assert_eq!(arrangement.tiled, vec![window(2)]);
    assert_eq!(arrangement.floating, vec![window(1)]);

    h.send(Event::WindowMinimized(window(2)));
    assert_eq!(h.reactor.windows(None)[1].mode, WindowMode::Minimized);
    h.send(Event::WindowUnminimized(window(2)));
    assert_eq!(h.reactor.windows(None)[1].mode, WindowMode::Tiled);

    h.send(Event::WindowDragged(window(2)));
    assert_eq!(h.reactor.windows(None)[1].mode, WindowMode::Floating);
    assert_eq!(h.store.window_state(id_of(&h, 2))["floating"], json!(true));
}

#[test]
fn surface_events_rearrange_the_visible_desktop() {
    let mut h = Harness::new(Config::default());
    h.add(1, 0);
    h.send(Event::SurfaceChanged(SurfaceId::new(1, 0)));
    let surfaces = h.reactor.surfaces();
    assert_eq!(surfaces.len(), 4);
    assert!(surfaces.iter().any(|s| s.id == SurfaceId::new(1, 0) && s.is_current));
    assert!(h.host.arrangement(SurfaceId::new(1, 1)).is_some());

    h.send(Event::SurfaceSetChanged(Topology::new(1, 1)));
    assert_eq!(h.reactor.surfaces().len(), 1);
    assert!(h.reactor.windows(None)[0].is_visible);
}

#[test]
fn startup_reconciles_host_windows_with_the_persisted_list() {
    let store = PersistentStore::in_memory();
    let host = HeadlessHost::new(Topology::new(1, 2));
    for raw in [10, 11] {
        let info = WindowInfo { host_id: Some(raw + 100), ..konsole(0, 1) };
        host.insert_window(window(raw), info);
    }
    store.put_window_list(&[WindowId::new(111), WindowId::new(500), WindowId::new(110)]).unwrap();
    store.put_window_state(WindowId::new(110), json!({ "group": 6, "ratio": 0.3 })).unwrap();

    let h = Harness::with_store(Config::default(), store.clone(), host);
    assert_eq!(store.window_list(), vec![WindowId::new(111), WindowId::new(110)]);
    let windows = h.reactor.windows(None);
    assert_eq!(windows[1].group, group(6));
    assert_eq!(windows[1].class.as_deref(), Some("konsole"));
    assert_eq!(store.window_state(WindowId::new(110))["ratio"], json!(0.3));
}

#[test]
fn durable_host_ids_survive_a_restart() {
    let store = PersistentStore::in_memory();
    let info = WindowInfo { host_id: Some(42), ..konsole(0, 0) };
    {
        let mut h = Harness::with_store(
            Config::default(),
            store.clone(),
            HeadlessHost::new(Topology::new(2, 2)),
        );
        h.send(Event::WindowAdded(window(1), info.clone()));
        h.focus(1);
        h.command("change_window_group_5");
    }
    let host = HeadlessHost::new(Topology::new(2, 2));
    host.insert_window(window(77), info);
    let h = Harness::with_store(Config::default(), store, host);
    let data = h.reactor.windows(None).pop().unwrap();
    assert_eq!(data.id, WindowId::new(42));
    assert_eq!(data.group, group(5));
}

#[test]
fn garbage_collection_spares_live_and_listed_windows() {
    let mut h = Harness::new(Config::default());
    h.store.put_window_state(WindowId::new(9), json!({ "group": 2 })).unwrap();
    h.add(1, 0);
    h.send(Event::CollectGarbage);
    assert_eq!(h.store.window_state_ids(), vec![id_of(&h, 1)]);
}

#[test]
fn config_updates_reregister_bindings_and_layouts() {
    let mut h = Harness::new(Config::default());
    h.add(1, 0);
    let mut config = Config::default();
    config.settings.layouts.enabled = vec![LayoutKind::Monocle, LayoutKind::Tile];
    config.bindings.insert("rotate".to_string(), "Meta+Y".to_string());
    h.send(Event::ConfigUpdated(config));

    assert_eq!(h.host.shortcut("rotate").unwrap().keybinding, "Meta+Y");
    assert_eq!(h.reactor.engine().unwrap().enabled_layouts().len(), 2);
    assert_eq!(h.host.arrangement(ORIGIN).unwrap().layout, LayoutKind::Tile);
}

#[test]
fn legacy_mode_bypasses_the_engine() {
    let handler = RecordingHandler::default();
    let mut h = Harness::legacy(handler.clone());
    assert!(!h.reactor.is_native());
    assert!(h.reactor.engine().is_none());
    assert_eq!(h.host.shortcuts(), vec!["legacy_tile".to_string()]);
    assert_eq!(handler.calls(), vec!["init", "surface_update"]);

    h.add(5, 0);
    h.send(Event::SurfaceChanged(SurfaceId::new(1, 0)));
    h.command("legacy_tile");
    h.command("rotate");
    assert_eq!(
        handler.calls(),
        vec!["init", "surface_update", "added 5", "current_surface_changed", "legacy_tile"]
    );
    assert_eq!(h.reactor.window_list(), vec![WindowId::new(7), WindowId::new(8)]);
    assert!(h.reactor.windows(None).is_empty());
    assert!(h.host.arrangements().is_empty());
}

#[test]
fn queries_are_answered_by_a_spawned_reactor() {
    let host = HeadlessHost::new(Topology::new(1, 1));
    let reactor = Reactor::new(
        Config::default(),
        PersistentStore::in_memory(),
        Box::new(host.clone()),
        None,
        Record::default(),
    );
    let handle = reactor.spawn().unwrap();
    handle.send(Event::WindowAdded(window(1), konsole(0, 0)));
    handle.send(Event::WindowAdded(window(2), konsole(0, 0)));
    handle.send(Event::WindowActivated(Some(window(2))));

    let windows = handle.query_windows(Some(ORIGIN));
    assert_eq!(windows.len(), 2);
    assert!(windows[1].is_focused);
    assert_eq!(handle.query_window(window(1)).unwrap().title.as_deref(), Some("shell"));
    assert_eq!(handle.query_window(window(3)), None);
    assert_eq!(handle.query_window_list().len(), 2);
    let surfaces = handle.query_surfaces();
    assert_eq!(surfaces.len(), 1);
    assert_eq!(surfaces[0].window_count, 2);
}

#[tokio::test]
async fn run_loop_processes_events_in_order() {
    let host = HeadlessHost::new(Topology::new(1, 1));
    let store = PersistentStore::in_memory();
    let reactor =
        Reactor::new(Config::default(), store.clone(), Box::new(host.clone()), None, Record::default());
    let (tx, rx) = actor::channel();
    tx.send(Event::WindowAdded(window(1), konsole(0, 0)));
    tx.send(Event::WindowRemoved(window(1)));
    tx.send(Event::WindowAdded(window(2), konsole(0, 0)));
    drop(tx);
    Reactor::run(reactor, rx).await;

    assert_eq!(store.window_list().len(), 1);
    assert_eq!(host.arrangement(ORIGIN).unwrap().tiled, vec![window(2)]);
}
