/// Change notifications fired by tree mutations. Nodes are named by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    PropertyChanged {
        node: String,
        property: &'static str,
    },
    /// `property` is `None` for bulk changes.
    InheritanceChanged {
        node: String,
        property: Option<&'static str>,
    },
    ChildAdded {
        parent: String,
        child: String,
    },
    ChildRemoved {
        parent: String,
        child: String,
    },
    LinkChanged {
        node: String,
        target: Option<String>,
    },
}
