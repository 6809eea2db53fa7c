//! AST walk: find instrumentable functions and build injection records.

use tree_sitter::Node;
use typetrace_core::model::{EntityContext, ObservationMetadata, ParameterTyping};

use crate::callee::{argument_index, callee_path};
use crate::params::{self, node_text, ParamInfo};
use crate::rewrite::Injection;

/// Walks a parsed tree and accumulates the text insertions that implant
/// `twiz` records. Per-node failures skip that node and continue.
pub struct Visitor<'a> {
    source: &'a str,
    filename_json: String,
    injections: Vec<Injection>,
}

impl<'a> Visitor<'a> {
    pub fn new(source: &'a str, filename: &str) -> Self {
        Self {
            source,
            filename_json: serde_json::to_string(filename)
                .unwrap_or_else(|_| "\"\"".to_string()),
            injections: Vec::new(),
        }
    }

    /// Pre-order walk, enclosing functions before nested ones.
    pub fn collect(mut self, root: Node<'a>) -> Vec<Injection> {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let instrumented = match node.kind() {
                "function_declaration" | "generator_function_declaration" => {
                    self.function_declaration(node)
                }
                "method_definition" => self.method(node),
                "arrow_function" | "function_expression" | "function" | "generator_function" => {
                    self.function_like(node)
                }
                _ => Some(()),
            };
            if instrumented.is_none() {
                tracing::debug!(
                    kind = node.kind(),
                    line = node.start_position().row + 1,
                    "skipped uninstrumentable node"
                );
            }

            let mut cursor = node.walk();
            let children: Vec<Node<'a>> = node.named_children(&mut cursor).collect();
            for child in children.into_iter().rev() {
                stack.push(child);
            }
        }
        self.injections
    }

    fn function_declaration(&mut self, node: Node<'a>) -> Option<()> {
        let name_node = node.child_by_field_name("name")?;
        if name_node.kind() != "identifier" {
            return None;
        }
        let name = node_text(name_node, self.source).to_string();
        let params_node = node.child_by_field_name("parameters")?;
        let body = node.child_by_field_name("body")?;

        self.emit_function(
            &name,
            &name,
            EntityContext::FunctionDeclarationParameter,
            node,
            params::extract_params(params_node, self.source),
            params::declared_count(params_node),
            body,
            None,
        );
        Some(())
    }

    fn method(&mut self, node: Node<'a>) -> Option<()> {
        let name_node = node.child_by_field_name("name")?;
        let method_name = match name_node.kind() {
            "property_identifier" | "private_property_identifier" | "identifier" => {
                node_text(name_node, self.source).to_string()
            }
            _ => return None,
        };
        let params_node = node.child_by_field_name("parameters")?;
        // Abstract methods and overload signatures carry no body.
        let body = node.child_by_field_name("body")?;

        let (base, function_name, context) = match node.parent()?.kind() {
            "class_body" if method_name == "constructor" => {
                let class_name =
                    self.enclosing_class_name(node).unwrap_or_else(|| "constructor".to_string());
                ("constructor".to_string(), class_name, EntityContext::ConstructorParameter)
            }
            "class_body" => {
                (method_name.clone(), method_name, EntityContext::ClassMethodParameter)
            }
            "object" => (method_name.clone(), method_name, EntityContext::ObjectMethodParameter),
            _ => return None,
        };

        self.emit_function(
            &base,
            &function_name,
            context,
            node,
            params::extract_params(params_node, self.source),
            params::declared_count(params_node),
            body,
            None,
        );
        Some(())
    }

    fn function_like(&mut self, node: Node<'a>) -> Option<()> {
        let parent = node.parent()?;

        // A function literal passed directly as a call argument.
        if parent.kind() == "arguments" {
            if let Some(call) = parent.parent().filter(|p| p.kind() == "call_expression") {
                let callee_node = call.child_by_field_name("function")?;
                let callee = callee_path(callee_node, self.source);
                let index = argument_index(parent, node)?;
                let base = format!("{callee}_arg{index}");
                let (params, declared) = self.function_params(node)?;
                let body = node.child_by_field_name("body")?;

                self.emit_function(
                    &base,
                    &base,
                    EntityContext::CallbackArgumentParameter,
                    node,
                    params,
                    declared,
                    body,
                    Some((callee.as_str(), index)),
                );
                return Some(());
            }
        }

        // A variable-bound arrow function.
        if node.kind() == "arrow_function" && parent.kind() == "variable_declarator" {
            let name_node = parent.child_by_field_name("name")?;
            let is_value = parent
                .child_by_field_name("value")
                .is_some_and(|value| value.id() == node.id());
            if name_node.kind() == "identifier" && is_value {
                let name = node_text(name_node, self.source).to_string();
                let (params, declared) = self.function_params(node)?;
                let body = node.child_by_field_name("body")?;

                self.emit_function(
                    &name,
                    &name,
                    EntityContext::ArrowFunctionParameter,
                    node,
                    params,
                    declared,
                    body,
                    None,
                );
            }
        }

        // Other function literals (IIFEs, property values, exports) are
        // outside the instrumented construct set.
        Some(())
    }

    fn function_params(&self, node: Node<'a>) -> Option<(Vec<ParamInfo>, u32)> {
        if let Some(params_node) = node.child_by_field_name("parameters") {
            Some((
                params::extract_params(params_node, self.source),
                params::declared_count(params_node),
            ))
        } else if let Some(single) = node.child_by_field_name("parameter") {
            match params::bare_arrow_param(single, self.source) {
                Some(info) => Some((vec![info], 1)),
                None => Some((Vec::new(), 1)),
            }
        } else {
            None
        }
    }

    fn enclosing_class_name(&self, node: Node<'a>) -> Option<String> {
        let mut current = node.parent();
        while let Some(ancestor) = current {
            if matches!(ancestor.kind(), "class_declaration" | "class") {
                let name = ancestor.child_by_field_name("name")?;
                return Some(node_text(name, self.source).to_string());
            }
            current = ancestor.parent();
        }
        None
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_function(
        &mut self,
        base: &str,
        function_name: &str,
        context: EntityContext,
        head: Node<'a>,
        params: Vec<ParamInfo>,
        declared_count: u32,
        body: Node<'a>,
        callee: Option<(&str, u32)>,
    ) {
        let head_pos = head.start_position();
        let mut stmts = Vec::with_capacity(params.len() + 1);

        for param in &params {
            let meta = ObservationMetadata {
                function_name: Some(function_name.to_string()),
                parameter_name: Some(param.name.clone()),
                parameter_index: Some(param.index),
                parameter_type: Some(if param.annotated {
                    ParameterTyping::Annotated
                } else {
                    ParameterTyping::Untyped
                }),
                has_default: param.has_default.then_some(true),
                is_destructured: param.is_destructured.then_some(true),
                is_rest: param.is_rest.then_some(true),
                accessibility: param.accessibility,
                context: Some(context.as_str().to_string()),
                line_number: Some(param.line),
                column_number: Some(param.column),
                callee_name: callee.map(|(name, _)| name.to_string()),
                callee_arg_index: callee.map(|(_, index)| index),
            };
            stmts.push(self.twiz_statement(
                &format!("{base}_param_{}", param.name),
                &param.value_expr,
                param.offset,
                &meta,
            ));
        }

        let entry_meta = ObservationMetadata {
            function_name: Some(function_name.to_string()),
            context: Some(EntityContext::FunctionEntry.as_str().to_string()),
            line_number: Some(head_pos.row as u32 + 1),
            column_number: Some(head_pos.column as u32),
            ..Default::default()
        };
        stmts.push(self.twiz_statement(
            &format!("{base}_entry"),
            &declared_count.to_string(),
            head.start_byte(),
            &entry_meta,
        ));

        let joined = stmts.join(" ");
        if body.kind() == "statement_block" {
            self.injections.push(Injection {
                pos: body.start_byte() + 1,
                text: format!(" {joined}"),
            });
        } else {
            // Expression-bodied arrow: rewrite to a block that returns the
            // original expression, all on the original physical lines.
            self.injections.push(Injection {
                pos: body.start_byte(),
                text: format!("{{ {joined} return "),
            });
            self.injections.push(Injection { pos: body.end_byte(), text: "; }".to_string() });
        }
    }

    fn twiz_statement(
        &self,
        label: &str,
        value_expr: &str,
        offset: usize,
        metadata: &ObservationMetadata,
    ) -> String {
        let label_json =
            serde_json::to_string(label).unwrap_or_else(|_| "\"\"".to_string());
        let meta_json =
            serde_json::to_string(metadata).unwrap_or_else(|_| "{}".to_string());
        format!(
            "try {{ twiz({label_json}, {value_expr}, {offset}, {filename}, {meta_json}) }} catch {{}};",
            filename = self.filename_json,
        )
    }
}
