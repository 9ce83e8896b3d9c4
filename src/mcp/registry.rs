//! Schema Registry
//!
//! Declarative shapes of every tool, resource and prompt. Built once at
//! start-up and immutable afterwards; names are unique per namespace.

use super::error::RegistryError;
use super::models::{PromptDescriptor, ResourceDescriptor, ResourceTemplateDescriptor, ToolDescriptor};
use super::tools::ToolHandler;
use super::{prompts, resources, tools};
use std::collections::HashMap;
use std::sync::Arc;

/// A tool's descriptor paired with its handler
#[derive(Clone)]
pub struct RegisteredTool {
    pub descriptor: ToolDescriptor,
    pub handler: Arc<dyn ToolHandler>,
}

#[derive(Default)]
pub struct SchemaRegistry {
    tools: HashMap<String, RegisteredTool>,
    /// Registration order, used for listing
    tool_order: Vec<String>,
    resources: Vec<ResourceDescriptor>,
    templates: Vec<ResourceTemplateDescriptor>,
    prompts: HashMap<String, PromptDescriptor>,
    prompt_order: Vec<String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every commerce tool, resource and prompt.
    pub fn commerce() -> Result<Self, RegistryError> {
        let mut registry = Self::new();

        for tool in tools::all() {
            registry.register_tool(tool)?;
        }
        for resource in resources::static_resources() {
            registry.register_resource(resource)?;
        }
        for template in resources::templates() {
            registry.register_template(template)?;
        }
        for prompt in prompts::descriptors() {
            registry.register_prompt(prompt)?;
        }

        tracing::debug!(
            tools = registry.tool_order.len(),
            resources = registry.resources.len(),
            templates = registry.templates.len(),
            prompts = registry.prompt_order.len(),
            "Schema registry built"
        );
        Ok(registry)
    }

    pub fn register_tool(&mut self, handler: Arc<dyn ToolHandler>) -> Result<(), RegistryError> {
        let descriptor = handler.descriptor();
        let name = descriptor.name.clone();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }

        self.tool_order.push(name.clone());
        self.tools.insert(
            name,
            RegisteredTool {
                descriptor,
                handler,
            },
        );
        Ok(())
    }

    pub fn register_resource(&mut self, resource: ResourceDescriptor) -> Result<(), RegistryError> {
        if self.resources.iter().any(|r| r.uri == resource.uri) {
            return Err(RegistryError::DuplicateResource(resource.uri));
        }
        self.resources.push(resource);
        Ok(())
    }

    pub fn register_template(
        &mut self,
        template: ResourceTemplateDescriptor,
    ) -> Result<(), RegistryError> {
        if self
            .templates
            .iter()
            .any(|t| t.uri_template == template.uri_template)
        {
            return Err(RegistryError::DuplicateResource(template.uri_template));
        }
        self.templates.push(template);
        Ok(())
    }

    pub fn register_prompt(&mut self, prompt: PromptDescriptor) -> Result<(), RegistryError> {
        if self.prompts.contains_key(&prompt.name) {
            return Err(RegistryError::DuplicatePrompt(prompt.name));
        }
        self.prompt_order.push(prompt.name.clone());
        self.prompts.insert(prompt.name.clone(), prompt);
        Ok(())
    }

    pub fn tool(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    pub fn prompt(&self, name: &str) -> Option<&PromptDescriptor> {
        self.prompts.get(name)
    }

    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.tool_order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.descriptor.clone())
            .collect()
    }

    pub fn list_resources(&self) -> &[ResourceDescriptor] {
        &self.resources
    }

    pub fn list_templates(&self) -> &[ResourceTemplateDescriptor] {
        &self.templates
    }

    pub fn list_prompts(&self) -> Vec<PromptDescriptor> {
        self.prompt_order
            .iter()
            .filter_map(|name| self.prompts.get(name))
            .cloned()
            .collect()
    }
}
