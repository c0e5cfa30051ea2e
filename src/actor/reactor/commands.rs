//! The named user commands surfaced to the key-binding layer.

use once_cell::sync::Lazy;
use tracing::debug;

use crate::common::collections::{BTreeMap, HashMap};
use crate::common::config::ConfigError;
use crate::layout_engine::{Direction, LayoutAction, LayoutCommand, LayoutKind, Step};
use crate::model::ids::GroupId;
use crate::sys::host::ShortcutRegistrar;

/// Display name of the shortcut component the commands are registered under.
pub const COMPONENT_NAME: &str = "Window Tiling";

#[derive(Debug, Clone, PartialEq)]
pub struct CommandDef {
    pub id: String,
    pub description: String,
    pub default_keybinding: String,
    pub command: LayoutCommand,
}

fn def(id: &str, description: &str, keybinding: &str, command: LayoutCommand) -> CommandDef {
    CommandDef {
        id: id.to_string(),
        description: description.to_string(),
        default_keybinding: keybinding.to_string(),
        command,
    }
}

const DIRECTIONS: [(Direction, &str, &str, &str); 4] = [
    (Direction::Up, "upper", "Up", "K"),
    (Direction::Down, "bottom", "Down", "J"),
    (Direction::Left, "left", "Left", "H"),
    (Direction::Right, "right", "Right", "L"),
];

/// Digit key for a group: groups 1..=10 and 11..=20 share the keys 1..9, 0.
fn group_key(group: GroupId) -> u8 { group.get() % 10 }

fn build_catalogue() -> Vec<CommandDef> {
    use LayoutAction as A;
    use LayoutCommand as C;

    let mut commands = vec![
        def("focus_next_window", "Focus Next Window", "", C::FocusOrder(Step::Next)),
        def("focus_prev_window", "Focus Previous Window", "", C::FocusOrder(Step::Previous)),
    ];
    for (direction, name, _, key) in DIRECTIONS {
        let label = match direction {
            Direction::Up => "Upper",
            Direction::Down => "Bottom",
            Direction::Left => "Left",
            Direction::Right => "Right",
        };
        commands.push(def(
            &format!("focus_{name}_window"),
            &format!("Focus {label} Window"),
            &format!("Meta+{key}"),
            C::Layout(A::Focus(direction)),
        ));
    }
    commands.push(def(
        "move_window_to_next_pos",
        "Move Window to the Next Position",
        "",
        C::MoveOrder(Step::Next),
    ));
    commands.push(def(
        "move_window_to_prev_pos",
        "Move Window to the Previous Position",
        "",
        C::MoveOrder(Step::Previous),
    ));
    for (direction, name, label, key) in DIRECTIONS {
        commands.push(def(
            &format!("move_window_to_{name}_pos"),
            &format!("Move Window {label}"),
            &format!("Meta+Shift+{key}"),
            C::Layout(A::Move(direction)),
        ));
    }
    for (direction, name, label, key) in DIRECTIONS {
        commands.push(def(
            &format!("move_window_to_{name}_surf"),
            &format!("Move Window {label} Surface"),
            &format!("Meta+Alt+{key}"),
            C::MoveToSurface(direction),
        ));
    }
    commands.extend([
        def("increase_window_width", "Increase Window Width", "Meta+Ctrl+L", C::Layout(A::GrowWidth)),
        def("increase_window_height", "Increase Window Height", "Meta+Ctrl+J", C::Layout(A::GrowHeight)),
        def("decrease_window_width", "Decrease Window Width", "Meta+Ctrl+H", C::Layout(A::ShrinkWidth)),
        def("decrease_window_height", "Decrease Window Height", "Meta+Ctrl+K", C::Layout(A::ShrinkHeight)),
        def(
            "increase_master_win_count",
            "Increase Master Area Window Count",
            "Meta+]",
            C::Layout(A::IncreaseMasterCount),
        ),
        def(
            "decrease_master_win_count",
            "Decrease Master Area Window Count",
            "Meta+[",
            C::Layout(A::DecreaseMasterCount),
        ),
        def("increase_master_size", "Increase Master Area Size", "", C::Layout(A::IncreaseMasterSize)),
        def("decrease_master_size", "Decrease Master Area Size", "", C::Layout(A::DecreaseMasterSize)),
        def("toggle_window_floating", "Toggle Active Window Floating", "Meta+F", C::ToggleFloating),
        def("push_window_to_master", "Push Active Window to Master Area", "Meta+Return", C::PushToMaster),
        def("next_layout", "Switch to the Next Layout", "Meta+\\", C::CycleLayout(Step::Next)),
        def("prev_layout", "Switch to the Previous Layout", "Meta+|", C::CycleLayout(Step::Previous)),
        def("toggle_tile_layout", "Toggle Tile Layout", "Meta+T", C::ToggleLayout(LayoutKind::Tile)),
        def(
            "toggle_monocle_layout",
            "Toggle Monocle Layout",
            "Meta+M",
            C::ToggleLayout(LayoutKind::Monocle),
        ),
        def("rotate", "Rotate Layout Clockwise", "Meta+R", C::Layout(A::Rotate)),
        def("rotate_reverse", "Rotate Layout Counterclockwise", "", C::Layout(A::RotateReverse)),
        def("rotate_part", "Rotate Sublayout Clockwise", "Meta+Shift+R", C::Layout(A::RotatePart)),
    ]);
    for group in GroupId::all() {
        let modifiers = if group.get() <= 10 { "Meta+Shift" } else { "Meta+Hyper" };
        commands.push(def(
            &format!("swap_group_{group}_surface"),
            &format!("Swap Group {group} to Active Monitor"),
            &format!("{modifiers}+{}", group_key(group)),
            C::SwapGroupToSurface(group),
        ));
    }
    for group in GroupId::all() {
        let modifiers = if group.get() <= 10 { "Meta+Ctrl" } else { "Hyper+Ctrl" };
        commands.push(def(
            &format!("change_window_group_{group}"),
            &format!("Send Active Window to Group {group}"),
            &format!("{modifiers}+{}", group_key(group)),
            C::AssignWindowToGroup(group),
        ));
    }
    commands
}

pub static CATALOGUE: Lazy<Vec<CommandDef>> = Lazy::new(build_catalogue);

static BY_ID: Lazy<HashMap<&'static str, &'static CommandDef>> =
    Lazy::new(|| CATALOGUE.iter().map(|def| (def.id.as_str(), def)).collect());

pub fn find(id: &str) -> Option<&'static CommandDef> { BY_ID.get(id).copied() }

/// Registers every catalogue entry, applying keybinding overrides. Returns the
/// number of commands registered.
pub fn register_all<R>(registrar: &mut R, bindings: &BTreeMap<String, String>) -> usize
where R: ShortcutRegistrar + ?Sized {
    for def in CATALOGUE.iter() {
        let keybinding = bindings.get(&def.id).unwrap_or(&def.default_keybinding);
        registrar.register_shortcut(&def.id, &def.description, keybinding);
    }
    debug!(count = CATALOGUE.len(), "registered shortcuts");
    CATALOGUE.len()
}

pub fn unknown_bindings(bindings: &BTreeMap<String, String>) -> Vec<ConfigError> {
    bindings
        .keys()
        .filter(|id| find(id).is_none())
        .map(|id| ConfigError::UnknownCommand(id.clone()))
        .collect()
}
