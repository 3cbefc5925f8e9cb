//! Quiz schema builder
//!
//! Turns a [`QuizDefinition`] into the ordered, indexable form model the
//! session navigates: a synthetic contact section followed by the question
//! sections, every field carrying a namespaced id.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::{
    definition::{generate_slug, AnswerOption, ContactFieldDef, InputType, QuizDefinition, ResultBand},
    error::{Error, Result},
    field::{DataType, Field, TextPolicy},
};

/// Prefix used when none is configured
pub const DEFAULT_ID_PREFIX: &str = "qsf";

/// Un-namespaced id of the synthetic contact section
pub const CONTACT_SECTION_ID: &str = "contact";

const ANSWER_KEY_PREFIX: &str = "question-";
const QUESTION_MESSAGE: &str = "Please answer the question";

/// Options the builder needs from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaConfig {
    pub id_prefix: String,
    /// Apply the ASCII-only check to email, phone and name contact fields
    pub contact_text_ascii_only: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            contact_text_ascii_only: true,
        }
    }
}

/// An ordered group of fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub title: String,
    pub slug: String,
    /// 0 for the contact section, 1-based for question sections
    pub order: usize,
    pub field_ids: Vec<String>,
    pub is_question_section: bool,
}

/// A question section together with its resolved fields
#[derive(Debug, Clone, Copy)]
pub struct QuestionSection<'a> {
    pub section: &'a Section,
    pub fields: &'a [Field],
}

/// The built form model
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    title: String,
    slug: String,
    description: String,
    instructions: String,
    id_prefix: String,
    contact_section: Section,
    contact_fields: Vec<Field>,
    question_sections: Vec<Section>,
    /// Question fields in section-then-question order
    question_fields: Vec<Field>,
    answer_options: Vec<AnswerOption>,
    result_bands: Vec<ResultBand>,
    #[serde(skip)]
    lookup: HashMap<String, FieldSlot>,
    /// Start of each question section within `question_fields`
    #[serde(skip)]
    section_starts: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldSlot {
    Contact(usize),
    Question(usize),
}

impl FormSchema {
    /// Build the schema for `definition`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Definition` when an id is blank or two namespaced ids
    /// collide.
    pub fn build(definition: &QuizDefinition, config: &SchemaConfig) -> Result<Self> {
        let prefix = config.id_prefix.as_str();
        let contact_section_id = namespaced(prefix, CONTACT_SECTION_ID);

        let contact_fields = definition
            .contact_fields
            .iter()
            .enumerate()
            .map(|(index, contact)| contact_field(prefix, &contact_section_id, contact, index + 1, config))
            .collect::<Result<Vec<_>>>()?;

        let contact_section = Section {
            id: contact_section_id,
            title: "Contact".to_string(),
            slug: CONTACT_SECTION_ID.to_string(),
            order: 0,
            field_ids: contact_fields.iter().map(|field| field.id.clone()).collect(),
            is_question_section: false,
        };

        let answer_values: Vec<String> = definition
            .answer_options
            .iter()
            .map(|answer| answer.value.clone())
            .collect();

        let mut question_sections = Vec::with_capacity(definition.question_sections.len());
        let mut question_fields = Vec::with_capacity(definition.question_count());
        let mut section_starts = Vec::with_capacity(definition.question_sections.len());

        for (section_index, section) in definition.question_sections.iter().enumerate() {
            let section_id = namespaced(prefix, non_blank(&section.id, "question section")?);
            section_starts.push(question_fields.len());

            let mut field_ids = Vec::with_capacity(section.questions.len());
            for (question_index, question) in section.questions.iter().enumerate() {
                let id = namespaced(prefix, non_blank(&question.id, "question")?);
                field_ids.push(id.clone());
                question_fields.push(Field {
                    id,
                    section_id: section_id.clone(),
                    order: question_index + 1,
                    html_type: "radio".to_string(),
                    label: question.text.clone(),
                    placeholder: question.text.clone(),
                    data_type: DataType::String,
                    min_length: Some(1),
                    max_length: Some(10),
                    message: QUESTION_MESSAGE.to_string(),
                    required: true,
                    is_question: true,
                    text_policy: TextPolicy::ASCII,
                    options: answer_values.clone(),
                });
            }

            let slug = if section.slug.is_empty() {
                generate_slug(&section.title)
            } else {
                section.slug.clone()
            };

            question_sections.push(Section {
                id: section_id,
                title: section.title.clone(),
                slug,
                order: section_index + 1,
                field_ids,
                is_question_section: true,
            });
        }

        ensure_unique_sections(&contact_section, &question_sections)?;
        let lookup = index_fields(&contact_fields, &question_fields)?;

        debug!(
            slug = %definition.slug,
            contact_fields = contact_fields.len(),
            sections = question_sections.len(),
            questions = question_fields.len(),
            "Built form schema"
        );

        Ok(Self {
            title: definition.title.clone(),
            slug: definition.slug.clone(),
            description: definition.description.clone(),
            instructions: definition.instructions.clone(),
            id_prefix: prefix.to_string(),
            contact_section,
            contact_fields,
            question_sections,
            question_fields,
            answer_options: definition.answer_options.clone(),
            result_bands: definition.result_bands.clone(),
            lookup,
            section_starts,
        })
    }

    /// Apply this schema's prefix to an id
    pub fn namespace(&self, id: &str) -> String {
        namespaced(&self.id_prefix, id)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Look up any field by namespaced id
    pub fn field(&self, id: &str) -> Option<&Field> {
        self.lookup.get(id).map(|slot| match *slot {
            FieldSlot::Contact(index) => &self.contact_fields[index],
            FieldSlot::Question(index) => &self.question_fields[index],
        })
    }

    /// Every field, contact fields first
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.contact_fields.iter().chain(&self.question_fields)
    }

    pub const fn contact_section(&self) -> &Section {
        &self.contact_section
    }

    /// Contact fields in display order
    pub fn contact_fields(&self) -> &[Field] {
        &self.contact_fields
    }

    /// Question sections in display order with their fields
    pub fn question_sections(&self) -> Vec<QuestionSection<'_>> {
        self.question_sections
            .iter()
            .zip(&self.section_starts)
            .map(|(section, &start)| QuestionSection {
                section,
                fields: &self.question_fields[start..start + section.field_ids.len()],
            })
            .collect()
    }

    /// All question fields in global order
    pub fn question_fields(&self) -> &[Field] {
        &self.question_fields
    }

    /// Namespaced question ids in global order
    pub fn question_ids(&self) -> impl Iterator<Item = &str> {
        self.question_fields.iter().map(|field| field.id.as_str())
    }

    pub fn total_questions(&self) -> usize {
        self.question_fields.len()
    }

    /// The question field at a global index
    pub fn question_at(&self, global_index: usize) -> Option<&Field> {
        self.question_fields.get(global_index)
    }

    /// Global index of a question, by raw or namespaced id
    pub fn global_index_of(&self, question_id: &str) -> Option<usize> {
        let lookup = |id: &str| match self.lookup.get(id) {
            Some(FieldSlot::Question(index)) => Some(*index),
            _ => None,
        };
        lookup(question_id).or_else(|| lookup(&self.namespace(question_id)))
    }

    /// Position of a global index within its question section
    pub fn local_index_of(&self, global_index: usize) -> Option<usize> {
        if global_index >= self.total_questions() {
            return None;
        }
        self.section_starts
            .iter()
            .rev()
            .find(|&&start| start <= global_index)
            .map(|start| global_index - start)
    }

    /// The value-map key an answer to `question_id` is stored under
    pub fn answer_key(question_id: &str) -> String {
        format!("{ANSWER_KEY_PREFIX}{question_id}")
    }

    /// Inverse of [`answer_key`](Self::answer_key)
    pub fn question_id_from_key(key: &str) -> Option<&str> {
        key.strip_prefix(ANSWER_KEY_PREFIX)
    }

    /// Whether an error or value key belongs to a question field
    pub fn is_question_key(&self, key: &str) -> bool {
        let id = Self::question_id_from_key(key).unwrap_or(key);
        matches!(self.lookup.get(id), Some(FieldSlot::Question(_)))
    }

    pub fn answer_options(&self) -> &[AnswerOption] {
        &self.answer_options
    }

    /// Display text of the answer option with the given value
    pub fn answer_label(&self, value: &str) -> Option<&str> {
        self.answer_options
            .iter()
            .find(|answer| answer.value == value)
            .map(|answer| answer.text.as_str())
    }

    pub fn result_bands(&self) -> &[ResultBand] {
        &self.result_bands
    }
}

fn namespaced(prefix: &str, id: &str) -> String {
    format!("{prefix}_{id}")
}

fn non_blank<'a>(id: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(Error::Definition(format!("A {what} has no id")))
    } else {
        Ok(trimmed)
    }
}

fn contact_field(
    prefix: &str,
    section_id: &str,
    contact: &ContactFieldDef,
    order: usize,
    config: &SchemaConfig,
) -> Result<Field> {
    let raw_id = if contact.id.trim().is_empty() {
        generate_slug(&contact.name)
    } else {
        contact.id.trim().to_string()
    };
    let id = namespaced(prefix, non_blank(&raw_id, "contact field")?);

    let data_type = match contact.input_type {
        InputType::Email => DataType::Email,
        InputType::Tel => DataType::Phone,
        InputType::Number => DataType::Int,
        InputType::Checkbox => DataType::Bool,
        InputType::Text
        | InputType::Textarea
        | InputType::Select
        | InputType::Radio => DataType::String,
    };

    let (min_length, max_length) = if data_type.is_textual() {
        (Some(2), Some(50))
    } else {
        (None, None)
    };

    let text_policy = match data_type {
        DataType::Email | DataType::Phone | DataType::Name if config.contact_text_ascii_only => {
            TextPolicy::STRICT
        }
        DataType::Email | DataType::Phone | DataType::Name | DataType::String => {
            TextPolicy::SCRIPT_FILTER
        }
        DataType::Int | DataType::Float | DataType::Number | DataType::Bool => TextPolicy::default(),
    };

    Ok(Field {
        id,
        section_id: section_id.to_string(),
        order,
        html_type: contact.input_type.to_string(),
        label: contact.name.clone(),
        placeholder: contact.placeholder.clone(),
        data_type,
        min_length,
        max_length,
        message: format!("Please enter your {}", contact.name.to_lowercase()),
        required: contact.required,
        is_question: false,
        text_policy,
        options: contact.options.clone(),
    })
}

fn ensure_unique_sections(contact: &Section, questions: &[Section]) -> Result<()> {
    let mut seen = HashSet::with_capacity(questions.len() + 1);
    std::iter::once(contact)
        .chain(questions)
        .try_for_each(|section| {
            if seen.insert(section.id.as_str()) {
                Ok(())
            } else {
                Err(Error::Definition(format!("Duplicate section id '{}'", section.id)))
            }
        })
}

fn index_fields(contact: &[Field], questions: &[Field]) -> Result<HashMap<String, FieldSlot>> {
    let slots = contact
        .iter()
        .enumerate()
        .map(|(index, field)| (field, FieldSlot::Contact(index)))
        .chain(
            questions
                .iter()
                .enumerate()
                .map(|(index, field)| (field, FieldSlot::Question(index))),
        );

    let mut lookup = HashMap::with_capacity(contact.len() + questions.len());
    for (field, slot) in slots {
        if lookup.insert(field.id.clone(), slot).is_some() {
            return Err(Error::Definition(format!("Duplicate field id '{}'", field.id)));
        }
    }
    Ok(lookup)
}
