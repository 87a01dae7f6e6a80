/// Group that qualifies independent-variable paths (`indeps.x`).
pub const INDEPENDENTS_GROUP: &str = "indeps";

/// Where an identifier points inside a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Address {
    /// Index into the independent variables, in declaration order.
    Independent(usize),

    /// Index into the component outputs, in declaration order.
    Output(usize),
}

/// Resolves bare and qualified names to outputs.
#[derive(Debug, Clone)]
pub(crate) struct Namespace {
    component: String,
    independents: Vec<String>,
    outputs: Vec<String>,
}

impl Namespace {
    pub(crate) fn new(component: String, independents: Vec<String>, outputs: Vec<String>) -> Self {
        Self {
            component,
            independents,
            outputs,
        }
    }

    /// Resolves `x`, `indeps.x`, `f` or `<component>.f`.
    ///
    /// A qualified name only matches within its own group.
    pub(crate) fn resolve(&self, name: &str) -> Option<Address> {
        if let Some(id) = strip_group(name, INDEPENDENTS_GROUP) {
            return self.independent(id);
        }
        if let Some(id) = strip_group(name, &self.component) {
            return self.output(id);
        }
        self.independent(name).or_else(|| self.output(name))
    }

    pub(crate) fn path(&self, address: Address) -> String {
        match address {
            Address::Independent(i) => format!("{INDEPENDENTS_GROUP}.{}", self.independents[i]),
            Address::Output(j) => format!("{}.{}", self.component, self.outputs[j]),
        }
    }

    pub(crate) fn independents(&self) -> &[String] {
        &self.independents
    }

    fn independent(&self, id: &str) -> Option<Address> {
        self.independents
            .iter()
            .position(|v| v == id)
            .map(Address::Independent)
    }

    fn output(&self, id: &str) -> Option<Address> {
        self.outputs.iter().position(|o| o == id).map(Address::Output)
    }
}

fn strip_group<'a>(name: &'a str, group: &str) -> Option<&'a str> {
    name.strip_prefix(group)?.strip_prefix('.')
}
