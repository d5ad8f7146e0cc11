use itertools::Itertools;

use crate::{encode::encode_string, Isa, Layout, Node, ObjectPool, Reference, Result, Value};

/// Marker line that starts every project file.
pub const FORMAT_MARKER: &str = "// !$*UTF8*$!";

/// Renders a document into the project file grammar.
///
/// References are resolved against `pool` while writing. Orderings that
/// depend on other objects (group children, project targets) are computed
/// here on every render.
pub(crate) struct Writer<'p> {
    pool: &'p ObjectPool,
    out: String,
}

/// One `key = value;` entry of a block.
enum Entry<'a> {
    Isa(Isa),
    Value(&'a Value),
    /// A list property reordered for output.
    List(Vec<&'a Value>),
    Node(&'a Node),
    Objects,
}

impl<'p> Writer<'p> {
    pub(crate) fn new(pool: &'p ObjectPool) -> Self {
        Self {
            pool,
            out: String::new(),
        }
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }

    pub(crate) fn write_document(&mut self, container: &Node) -> Result<()> {
        self.out.push_str(FORMAT_MARKER);
        self.out.push('\n');

        let mut entries: Vec<(&str, Entry<'_>)> = container
            .properties()
            .map(|(key, value)| (key, Entry::Value(value)))
            .collect();
        entries.push(("objects", Entry::Objects));
        entries.sort_by(|a, b| a.0.cmp(b.0));

        self.write_block(entries, container.layout(), 0)?;
        self.out.push('\n');
        Ok(())
    }

    fn write_block<'a>(
        &mut self,
        entries: Vec<(&'a str, Entry<'a>)>,
        layout: Layout,
        indent: usize,
    ) -> Result<()> {
        self.out.push('{');
        for (index, (key, entry)) in entries.into_iter().enumerate() {
            match layout {
                Layout::SingleLine => {
                    if index > 0 {
                        self.out.push(' ');
                    }
                }
                Layout::MultiLine => {
                    self.out.push('\n');
                    self.indent(indent + 1);
                }
            }
            self.write_entry(key, entry, layout, indent)?;
        }
        match layout {
            Layout::SingleLine => self.out.push_str(" }"),
            Layout::MultiLine => {
                self.out.push('\n');
                self.indent(indent);
                self.out.push('}');
            }
        }
        Ok(())
    }

    fn write_entry(&mut self, key: &str, entry: Entry<'_>, layout: Layout, indent: usize) -> Result<()> {
        self.out.push_str(key);

        let node = match &entry {
            Entry::Node(node) => Some(*node),
            Entry::Value(Value::Node(node)) => Some(&**node),
            _ => None,
        };
        if let Some(comment) = node.and_then(Node::comment) {
            self.write_comment(comment);
        }

        self.out.push_str(" = ");
        match entry {
            Entry::Isa(isa) => self.out.push_str(&encode_string(isa.as_str(), layout)),
            Entry::Value(value) => self.write_value(value, layout, indent + 1)?,
            Entry::List(values) => self.write_list(values, layout, indent + 1)?,
            Entry::Node(node) => self.write_node(node, indent + 1)?,
            Entry::Objects => self.write_objects(indent + 1)?,
        }
        self.out.push(';');
        Ok(())
    }

    fn write_value(&mut self, value: &Value, layout: Layout, indent: usize) -> Result<()> {
        match value {
            Value::Bool(true) => self.out.push_str("YES"),
            Value::Bool(false) => self.out.push_str("NO"),
            Value::Int(number) => self.out.push_str(&number.to_string()),
            Value::Text(text) => self.out.push_str(&encode_string(text, layout)),
            Value::List(values) => self.write_list(values, layout, indent)?,
            Value::Map(map) => {
                let entries = map
                    .iter()
                    .map(|(key, value)| (key.as_str(), Entry::Value(value)))
                    .collect();
                self.write_block(entries, layout, indent)?;
            }
            Value::Reference(reference) => self.write_reference(*reference)?,
            Value::Node(node) => self.write_node(node, indent)?,
        }
        Ok(())
    }

    fn write_list<'v>(
        &mut self,
        values: impl IntoIterator<Item = &'v Value>,
        layout: Layout,
        indent: usize,
    ) -> Result<()> {
        let multi_line = !layout.is_single_line();
        self.out.push('(');
        if multi_line {
            self.out.push('\n');
            self.indent(indent);
        }
        for value in values {
            if multi_line {
                self.out.push('\t');
            }
            self.write_value(value, layout, indent + 1)?;
            self.out.push(',');
            if multi_line {
                self.out.push('\n');
                self.indent(indent);
            }
        }
        self.out.push(')');
        Ok(())
    }

    fn write_reference(&mut self, reference: Reference) -> Result<()> {
        let target = self.pool.resolve(reference)?;
        self.out.push_str(&target.id().to_string());
        if let Some(comment) = target.comment() {
            self.write_comment(comment);
        }
        Ok(())
    }

    fn write_comment(&mut self, comment: &str) {
        if comment.is_empty() {
            return;
        }
        self.out.push_str(" /* ");
        self.out.push_str(comment);
        self.out.push_str(" */");
    }

    fn write_node(&mut self, node: &Node, indent: usize) -> Result<()> {
        let mut entries = vec![];
        if node.isa().writes_isa() {
            entries.push(("isa", Entry::Isa(node.isa())));
        }
        for (key, value) in node.properties() {
            let entry = match (node.isa(), key, value) {
                (Isa::Group, "children", Value::List(children)) => {
                    Entry::List(self.sorted_children(children)?)
                }
                (Isa::Project, "targets", Value::List(targets)) => {
                    Entry::List(self.sorted_targets(targets)?)
                }
                _ => Entry::Value(value),
            };
            entries.push((key, entry));
        }
        self.write_block(entries, node.layout(), indent)
    }

    /// Wraps each class of objects in `Begin`/`End` section comments; classes
    /// appear in name order, objects within a class in id order.
    fn write_objects(&mut self, indent: usize) -> Result<()> {
        let pool = self.pool;
        self.out.push_str("{\n");

        let sections = pool
            .iter()
            .sorted_by_key(|node| (node.isa().as_str(), node.id()))
            .chunk_by(|node| node.isa());

        for (isa, nodes) in &sections {
            self.out.push_str(&format!("\n/* Begin {isa} section */\n"));
            for node in nodes {
                self.indent(indent + 1);
                self.write_entry(&node.id().to_string(), Entry::Node(node), Layout::MultiLine, indent)?;
                self.out.push('\n');
            }
            self.out.push_str(&format!("/* End {isa} section */\n"));
        }

        self.indent(indent);
        self.out.push('}');
        Ok(())
    }

    /// Groups before files, then case-folded name order.
    fn sorted_children<'v>(&self, children: &'v [Value]) -> Result<Vec<&'v Value>> {
        let mut keyed = children
            .iter()
            .map(|child| {
                let key = match self.target_of(child)? {
                    Some(node) => (
                        node.isa() != Isa::Group,
                        fold_case(node.name().unwrap_or_default()),
                    ),
                    None => (true, String::new()),
                };
                Ok((key, child))
            })
            .collect::<Result<Vec<_>>>()?;
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(keyed.into_iter().map(|(_, child)| child).collect())
    }

    fn sorted_targets<'v>(&self, targets: &'v [Value]) -> Result<Vec<&'v Value>> {
        let mut keyed = targets
            .iter()
            .map(|target| {
                let name = self
                    .target_of(target)?
                    .and_then(Node::name)
                    .unwrap_or_default();
                Ok((name, target))
            })
            .collect::<Result<Vec<_>>>()?;
        keyed.sort_by(|a, b| a.0.cmp(b.0));
        Ok(keyed.into_iter().map(|(_, target)| target).collect())
    }

    fn target_of(&self, value: &Value) -> Result<Option<&'p Node>> {
        match value {
            Value::Reference(reference) => self.pool.resolve(*reference).map(Some),
            _ => Ok(None),
        }
    }

    fn indent(&mut self, depth: usize) {
        self.out.extend(std::iter::repeat('\t').take(depth));
    }
}

/// Full Unicode case folding: lowercase, plus the folds that expand or
/// differ from lowercasing.
fn fold_case(name: &str) -> String {
    let mut folded = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        match c {
            'ß' | 'ẞ' => folded.push_str("ss"),
            'ſ' => folded.push('s'),
            'ς' => folded.push('σ'),
            'µ' => folded.push('μ'),
            'ﬀ' => folded.push_str("ff"),
            'ﬁ' => folded.push_str("fi"),
            'ﬂ' => folded.push_str("fl"),
            'ﬃ' => folded.push_str("ffi"),
            'ﬄ' => folded.push_str("ffl"),
            'ﬅ' | 'ﬆ' => folded.push_str("st"),
            c => folded.push(c),
        }
    }
    folded
}
