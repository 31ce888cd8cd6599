//! Static menu tree stored as an index-linked arena

pub type NodeId = u8;

/// Side effect attached to entering or selecting a node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    ShowTime,
    ShowDate,
    ShowStopwatch,
    EditTime,
    ToggleStopwatch,
    BacklightOn,
    BacklightOff,
    EnterBootloader,
}

#[derive(Debug)]
pub struct MenuNode {
    pub label: &'static str,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    /// Siblings form a ring; an only child points at itself
    pub next: NodeId,
    pub prev: NodeId,
    pub on_enter: Option<Action>,
    pub on_select: Option<Action>,
}

impl MenuNode {
    const fn new(label: &'static str, parent: Option<NodeId>, first_child: Option<NodeId>, next: NodeId, prev: NodeId) -> Self {
        Self {
            label,
            parent,
            first_child,
            next,
            prev,
            on_enter: None,
            on_select: None,
        }
    }

    const fn entering(mut self, action: Action) -> Self {
        self.on_enter = Some(action);
        self
    }

    const fn selecting(mut self, action: Action) -> Self {
        self.on_select = Some(action);
        self
    }
}

pub const ROOT: NodeId = 0;

pub static MAIN_MENU: [MenuNode; 9] = [
    MenuNode::new("Clock", None, Some(1), 3, 8).entering(Action::ShowTime),
    MenuNode::new("Set time", Some(0), None, 2, 2).selecting(Action::EditTime),
    MenuNode::new("Show date", Some(0), None, 1, 1).entering(Action::ShowDate),
    MenuNode::new("Stopwatch", None, Some(4), 5, 0).entering(Action::ShowStopwatch),
    MenuNode::new("Start/Stop", Some(3), None, 4, 4).selecting(Action::ToggleStopwatch),
    MenuNode::new("Backlight", None, Some(6), 8, 3),
    MenuNode::new("On", Some(5), None, 7, 7).selecting(Action::BacklightOn),
    MenuNode::new("Off", Some(5), None, 6, 6).selecting(Action::BacklightOff),
    MenuNode::new("Bootloader", None, None, 0, 5).selecting(Action::EnterBootloader),
];

#[derive(Clone, Copy)]
pub struct MenuTree {
    nodes: &'static [MenuNode],
}

impl MenuTree {
    pub const fn new(nodes: &'static [MenuNode]) -> Self {
        Self { nodes }
    }

    pub fn node(&self, id: NodeId) -> &'static MenuNode {
        let nodes: &'static [MenuNode] = self.nodes;
        &nodes[id as usize]
    }
}

impl Default for MenuTree {
    fn default() -> Self {
        Self::new(&MAIN_MENU)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sibling rings close in both directions and every first child names
    /// its parent
    fn is_well_formed(tree: &MenuTree) -> bool {
        let len = tree.nodes.len();
        tree.nodes.iter().enumerate().all(|(id, node)| {
            let id = id as NodeId;
            let links_in_range = (node.next as usize) < len
                && (node.prev as usize) < len
                && node.parent.map_or(true, |p| (p as usize) < len)
                && node.first_child.map_or(true, |c| (c as usize) < len);
            links_in_range
                && tree.node(node.next).prev == id
                && tree.node(node.prev).next == id
                && tree.node(node.next).parent == node.parent
                && node.first_child.map_or(true, |c| tree.node(c).parent == Some(id))
        })
    }

    #[test]
    fn main_menu_is_well_formed() {
        let tree = MenuTree::default();
        assert_eq!(tree.nodes.len(), 9);
        assert!(is_well_formed(&tree));
        assert_eq!(tree.node(ROOT).parent, None);
    }

    #[test]
    fn broken_ring_is_detected() {
        static BROKEN: [MenuNode; 2] = [
            MenuNode::new("a", None, None, 1, 1),
            MenuNode::new("b", None, None, 0, 1),
        ];
        assert!(!is_well_formed(&MenuTree::new(&BROKEN)));
    }
}
