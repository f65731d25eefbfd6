//! Todo list component, end to end.
//!
//! Data, view, listeners, a filter flow and teardown, all through the
//! public API.
//!
//! Run with: cargo test --test todo_component

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use spark_dom::component::{create_component, mount, Component, ComponentDef, NodeMap, Scope, CONTAINER};
use spark_dom::engine::{Document, Event, ListenerOptions, Node};
use spark_dom::primitives::{element, Attrs, Child};
use spark_dom::signals::{signal, Signal};
use spark_dom::types::Props;

// =============================================================================
// DATA
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Todo {
    id: u32,
    text: String,
    completed: bool,
}

#[derive(Clone)]
struct TodoData {
    todos: Signal<Vec<Todo>>,
    new_text: Signal<String>,
    filter: Signal<String>,
}

impl TodoData {
    fn from_props(props: &Props) -> Self {
        let todos = props
            .get("todos")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        Self {
            todos: signal(todos),
            new_text: signal(String::new()),
            filter: signal("all".to_string()),
        }
    }

    fn add_todo(&self) {
        let text = self.new_text.get().trim().to_string();
        if text.is_empty() {
            return;
        }
        self.todos.update(|todos| {
            let id = todos.iter().map(|t| t.id).max().unwrap_or(0) + 1;
            let mut next = todos.clone();
            next.push(Todo { id, text, completed: false });
            next
        });
        self.new_text.set(String::new());
    }

    fn toggle_todo(&self, id: u32) {
        self.todos.update(|todos| {
            todos
                .iter()
                .map(|t| Todo {
                    completed: if t.id == id { !t.completed } else { t.completed },
                    ..t.clone()
                })
                .collect()
        });
    }

    fn remove_todo(&self, id: u32) {
        self.todos.update(|todos| todos.iter().filter(|t| t.id != id).cloned().collect());
    }

    fn clear_completed(&self) {
        self.todos.update(|todos| todos.iter().filter(|t| !t.completed).cloned().collect());
    }

    fn visible(&self) -> Vec<Todo> {
        let filter = self.filter.get();
        self.todos
            .get()
            .into_iter()
            .filter(|t| match filter.as_str() {
                "active" => !t.completed,
                "completed" => t.completed,
                _ => true,
            })
            .collect()
    }
}

// =============================================================================
// VIEW
// =============================================================================

type TodoScope<'a> = Scope<'a, TodoData, NodeMap>;

fn node(map: &NodeMap, name: &str) -> anyhow::Result<Node> {
    map.get(name)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("missing node {name}"))
}

fn render(list: &Node, data: &TodoData) -> anyhow::Result<()> {
    let doc = list.document().clone();
    list.clear_children();

    let todos = data.visible();
    if todos.is_empty() {
        let empty = element(&doc, "li", Attrs::new().attr("class", "empty-message"), "Nothing to do")?;
        list.append_child(&empty)?;
        return Ok(());
    }

    for todo in todos {
        let toggle_data = data.clone();
        let remove_data = data.clone();
        let id = todo.id;
        let item = element(
            &doc,
            "li",
            Attrs::new()
                .attr("class", if todo.completed { "todo-item completed" } else { "todo-item" })
                .attr("data-id", id),
            vec![
                Child::from(element(
                    &doc,
                    "input",
                    Attrs::new()
                        .attr("type", "checkbox")
                        .attr("checked", todo.completed)
                        .on("onchange", move |_| toggle_data.toggle_todo(id)),
                    (),
                )?),
                Child::from(element(&doc, "label", Attrs::new(), todo.text.as_str())?),
                Child::from(element(
                    &doc,
                    "button",
                    Attrs::new()
                        .attr("class", "todo-delete-btn")
                        .on("onclick", move |_| remove_data.remove_todo(id)),
                    "Delete",
                )?),
            ],
        )?;
        list.append_child(&item)?;
    }
    Ok(())
}

fn on_create(scope: &TodoScope<'_>) -> anyhow::Result<()> {
    let data = scope.data().clone();
    let nodes = scope.node();
    let list = node(nodes, "list")?;
    let input = node(nodes, "input")?;
    let form = node(nodes, "form")?;
    let counter = node(nodes, "counter")?;

    // Input → new_text, new_text → input.
    let typed = data.new_text.clone();
    let input_clone = input.clone();
    input.add_event_listener(
        "input",
        Rc::new(move |_: &mut Event| {
            let value = input_clone.property("value").unwrap_or_default();
            typed.set(value.to_string());
        }),
        ListenerOptions::NONE,
    );
    scope.watch(&data.new_text, {
        let input = input.clone();
        move |text: &String| {
            input.set_property("value", text.as_str());
        }
    });

    // Submit adds.
    let submit_data = data.clone();
    form.add_event_listener(
        "submit",
        Rc::new(move |e: &mut Event| {
            e.prevent_default();
            submit_data.add_todo();
        }),
        ListenerOptions::NONE,
    );

    // Filter buttons.
    for name in ["all", "active", "completed"] {
        let button = node(nodes, &format!("filter-{name}"))?;
        let filter = data.filter.clone();
        button.add_event_listener(
            "click",
            Rc::new(move |_: &mut Event| filter.set(name.to_string())),
            ListenerOptions::NONE,
        );
        scope.watch(&data.filter, move |current: &String| {
            button.class_list_toggle("active", Some(current == name));
        });
    }

    // Re-render on todos or filter.
    let render_data = data.clone();
    let render_list = list.clone();
    scope.watch(&data.todos, move |_| {
        if let Err(err) = render(&render_list, &render_data) {
            tracing::error!(%err, "todo render failed");
        }
    });
    let render_data = data.clone();
    scope.watch(&data.filter, move |_| {
        if let Err(err) = render(&list, &render_data) {
            tracing::error!(%err, "todo render failed");
        }
    });

    // Active count via a flow the component owns.
    let active = scope.flow(&data.todos, |f| f.filter(|t: &Todo| !t.completed));
    scope.watch(&active, move |todos: &Vec<Todo>| {
        counter.set_text_content(&format!("{} left", todos.len()));
    });

    Ok(())
}

fn todo_factory() -> spark_dom::component::ComponentFactory<TodoData, NodeMap> {
    create_component(
        ComponentDef::new(TodoData::from_props, |doc: &Document, _data: &TodoData| {
            let input = element(doc, "input", Attrs::new().attr("class", "todo-input"), ())?;
            let submit = element(doc, "button", Attrs::new().attr("type", "submit"), "Add")?;
            let form = element(doc, "form", Attrs::new(), vec![Child::from(&input), Child::from(&submit)])?;
            let list = element(doc, "ul", Attrs::new().attr("class", "todo-list"), ())?;
            let counter = element(doc, "span", Attrs::new().attr("class", "todo-count"), ())?;

            let mut map = NodeMap::new();
            let mut filters = Vec::new();
            for name in ["all", "active", "completed"] {
                let button = element(doc, "button", Attrs::new().attr("class", "filter-btn"), name)?;
                map.insert(&format!("filter-{name}"), button.clone());
                filters.push(Child::from(button));
            }
            let root = element(
                doc,
                "div",
                Attrs::new().attr("class", "todo-app"),
                vec![
                    Child::from(&form),
                    Child::from(&list),
                    Child::Seq(filters),
                    Child::from(&counter),
                ],
            )?;

            Ok(map
                .with(CONTAINER, root)
                .with("form", form)
                .with("input", input)
                .with("list", list)
                .with("counter", counter))
        })
        .on_create(on_create),
    )
}

// =============================================================================
// HELPERS
// =============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn setup() -> (Document, Node, Component<TodoData, NodeMap>) {
    init_tracing();
    let doc = Document::new();
    let body = doc.create_element("body").expect("valid tag");
    let props = json!({
        "todos": [
            { "id": 1, "text": "Learn signals", "completed": false },
            { "id": 2, "text": "Ship it", "completed": true },
        ]
    });
    let props = match props {
        serde_json::Value::Object(map) => map,
        _ => Props::new(),
    };
    let component = mount(&todo_factory(), &doc, Some(&body), props).expect("mounts");
    (doc, body, component)
}

fn list(component: &Component<TodoData, NodeMap>) -> Node {
    component.node().and_then(|n| n.get("list")).cloned().expect("list node")
}

fn labels(component: &Component<TodoData, NodeMap>) -> Vec<String> {
    list(component)
        .children()
        .iter()
        .map(Node::text_content)
        .collect()
}

fn named(component: &Component<TodoData, NodeMap>, name: &str) -> Node {
    component.node().and_then(|n| n.get(name)).cloned().expect("node")
}

// =============================================================================
// TESTS
// =============================================================================

#[test]
fn test_initial_render() {
    let (_, body, component) = setup();
    assert_eq!(body.child_count(), 1);
    assert_eq!(labels(&component), vec!["Learn signalsDelete", "Ship itDelete"]);
    assert_eq!(named(&component, "counter").text_content(), "1 left");
    assert!(named(&component, "filter-all").class_list_contains("active"));
}

#[test]
fn test_typing_and_submitting_adds_a_todo() {
    let (_, _, component) = setup();
    let input = named(&component, "input");
    let form = named(&component, "form");

    input.set_property("value", "  Write docs ");
    input.dispatch_event(&mut Event::new("input"));

    let mut submit = Event::new("submit");
    assert!(!form.dispatch_event(&mut submit));

    let data = component.data().expect("mounted");
    assert_eq!(data.todos.get().len(), 3);
    assert_eq!(data.todos.get()[2].text, "Write docs");
    assert_eq!(data.new_text.get(), "");
    assert_eq!(input.property("value").map(|v| v.to_string()).as_deref(), Some(""));
    assert_eq!(named(&component, "counter").text_content(), "2 left");
}

#[test]
fn test_toggle_remove_and_filter() {
    let (_, _, component) = setup();
    let first = list(&component).first_child().expect("item");
    let checkbox = first.first_child().expect("checkbox");
    checkbox.dispatch_event(&mut Event::new("change"));
    assert_eq!(named(&component, "counter").text_content(), "0 left");
    assert!(list(&component).first_child().expect("item").class_list_contains("completed"));

    named(&component, "filter-active").dispatch_event(&mut Event::new("click"));
    assert_eq!(labels(&component), vec!["Nothing to do"]);
    assert!(named(&component, "filter-active").class_list_contains("active"));
    assert!(!named(&component, "filter-all").class_list_contains("active"));

    named(&component, "filter-completed").dispatch_event(&mut Event::new("click"));
    let delete = list(&component).children()[1].children()[2].clone();
    delete.dispatch_event(&mut Event::new("click"));
    assert_eq!(labels(&component), vec!["Learn signalsDelete"]);

    component.data().expect("mounted").clear_completed();
    assert_eq!(labels(&component), vec!["Nothing to do"]);
}

#[test]
fn test_destroy_releases_everything() {
    let (_, body, component) = setup();
    let data = component.data().expect("mounted").clone();
    assert!(data.todos.subscriber_count() > 0);

    component.destroy().expect("destroys");
    assert_eq!(body.child_count(), 0);
    assert_eq!(data.todos.subscriber_count(), 0);
    assert_eq!(data.filter.subscriber_count(), 0);
    assert_eq!(data.new_text.subscriber_count(), 0);

    // Signals no longer reach the detached view.
    data.todos.set(Vec::new());
    assert_eq!(labels(&component), vec!["Learn signalsDelete", "Ship itDelete"]);
}

#[test]
fn test_update_props_is_shallow_merge() {
    let (_, _, component) = setup();
    let mut partial = Props::new();
    partial.insert("title".into(), json!("Groceries"));
    component.update_props(partial).expect("no on_props hook");
    let props = component.props();
    assert_eq!(props.get("title"), Some(&json!("Groceries")));
    assert!(props.contains_key("todos"));
}
