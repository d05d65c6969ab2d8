use indexmap::IndexMap;
use shared::domain::{FieldId, FieldType, OptionId};

pub const UNTITLED_QUESTION: &str = "Untitled Question";

/// Choice options in display order.
pub type Options = IndexMap<OptionId, String>;

/// Per-type payload of a question. Only the choice types carry options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    SingleSelect(Options),
    MultiSelect(Options),
}

impl FieldKind {
    pub fn empty(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => FieldKind::Text,
            FieldType::Number => FieldKind::Number,
            FieldType::SingleSelect => FieldKind::SingleSelect(Options::new()),
            FieldType::MultiSelect => FieldKind::MultiSelect(Options::new()),
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldKind::Text => FieldType::Text,
            FieldKind::Number => FieldType::Number,
            FieldKind::SingleSelect(_) => FieldType::SingleSelect,
            FieldKind::MultiSelect(_) => FieldType::MultiSelect,
        }
    }

    pub fn options(&self) -> Option<&Options> {
        match self {
            FieldKind::Text | FieldKind::Number => None,
            FieldKind::SingleSelect(options) | FieldKind::MultiSelect(options) => Some(options),
        }
    }

    pub fn options_mut(&mut self) -> Option<&mut Options> {
        match self {
            FieldKind::Text | FieldKind::Number => None,
            FieldKind::SingleSelect(options) | FieldKind::MultiSelect(options) => Some(options),
        }
    }

    /// Switches to `field_type`. Options survive a change between the two
    /// choice types and are dropped when moving to text or number.
    pub fn into_type(self, field_type: FieldType) -> Self {
        let options = match self {
            FieldKind::Text | FieldKind::Number => Options::new(),
            FieldKind::SingleSelect(options) | FieldKind::MultiSelect(options) => options,
        };
        match field_type {
            FieldType::Text => FieldKind::Text,
            FieldType::Number => FieldKind::Number,
            FieldType::SingleSelect => FieldKind::SingleSelect(options),
            FieldType::MultiSelect => FieldKind::MultiSelect(options),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub id: FieldId,
    pub label: String,
    pub required: bool,
    pub kind: FieldKind,
    pub(crate) omitted: Omitted,
}

/// Optional document keys a loaded question came without. Cleared as soon as
/// the matching attribute is edited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Omitted {
    pub(crate) label: bool,
    pub(crate) options: bool,
}

impl Field {
    /// A blank question of the given type. The id is assigned when the field
    /// is added to a form.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            id: FieldId(String::new()),
            label: String::new(),
            required: false,
            kind: FieldKind::empty(field_type),
            omitted: Omitted::default(),
        }
    }

    pub fn text() -> Self {
        Self::new(FieldType::Text)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self.omitted.label = false;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Replaces the options of a choice field; ignored for text and number.
    pub fn with_options<I, L>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (OptionId, L)>,
        L: Into<String>,
    {
        if let Some(existing) = self.kind.options_mut() {
            *existing = options
                .into_iter()
                .map(|(id, label)| (id, label.into()))
                .collect();
            self.omitted.options = false;
        }
        self
    }

    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    pub fn options(&self) -> Option<&Options> {
        self.kind.options()
    }

    pub fn option_labels(&self) -> impl Iterator<Item = &str> {
        self.kind
            .options()
            .into_iter()
            .flat_map(|options| options.values().map(String::as_str))
    }

    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            UNTITLED_QUESTION
        } else {
            &self.label
        }
    }
}

/// Partial update for [`Field`]; `None` leaves the attribute as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPatch {
    pub label: Option<String>,
    pub required: Option<bool>,
    pub field_type: Option<FieldType>,
    pub options: Option<Options>,
}

impl FieldPatch {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }
}
