//! A scripted HR application on top of `FakeDom`.
//!
//! Pages re-render the way the real one does: lists are rebuilt after a
//! post, edit or delete (old nodes go stale), confirmations arrive after a
//! delay, the composer's submit button sits under an overlay, and rich
//! text regions refuse `clear`.

use super::{El, FakeDom, NodeId, ROOT, SavedCandidate, SavedReport};
use holdfast_engine::config::HoldfastConfig;
use holdfast_engine::profile::UiProfile;
use holdfast_engine::protocol::SpecialKey;
use std::path::Path;
use std::time::Duration;

pub const BASE_URL: &str = "http://hr.test";
pub const USERNAME: &str = "Admin";
pub const PASSWORD: &str = "admin123";

pub fn profile() -> UiProfile {
    UiProfile::from_yaml(include_str!("hr_profile.yaml")).unwrap()
}

pub fn config(image: &Path) -> HoldfastConfig {
    let mut config = HoldfastConfig::default();
    config.target.base_url = BASE_URL.into();
    config.target.username = USERNAME.into();
    config.target.password = PASSWORD.into();
    config.fixtures.image = image.to_path_buf();
    config
}

/// An app whose base URL serves the login page.
pub fn app() -> FakeDom {
    let mut dom = FakeDom::new();
    dom.on_navigate(|dom, url| {
        if url.trim_end_matches('/') == BASE_URL {
            login_page(dom);
        }
    });
    dom
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn app_root(dom: &mut FakeDom) -> NodeId {
    match dom.select("div.app").first() {
        Some(id) => *id,
        None => dom.add(ROOT, El::new("div").class("app")),
    }
}

/// Replace the main content area, dropping any open overlay.
fn page(dom: &mut FakeDom) -> NodeId {
    for overlay in [
        "div.main",
        "div.listbox",
        "div.dropdown",
        "div.dialog",
        "div.modal",
    ] {
        dom.remove_all(overlay);
    }
    let app = app_root(dom);
    dom.add(app, El::new("div").class("main"))
}

// Login and shell

fn login_page(dom: &mut FakeDom) {
    dom.remove_all("div.app");
    let app = app_root(dom);
    let form = dom.add(app, El::new("form").class("login"));
    dom.add(form, El::input().attr("name", "username"));
    dom.add(form, El::input().attr("name", "password").attr("type", "password"));
    let submit = dom.add(
        form,
        El::new("button").attr("type", "submit").text("Login"),
    );
    dom.on_click(submit, move |dom| {
        let user = dom.value_of("input[name=\"username\"]");
        let pass = dom.value_of("input[name=\"password\"]");
        if user == USERNAME && pass == PASSWORD {
            dom.after(ms(300), dashboard);
        } else {
            dom.add(
                form,
                El::new("span").class("error-message").text("Invalid credentials"),
            );
        }
    });
}

fn dashboard(dom: &mut FakeDom) {
    dom.remove_all("div.app");
    let app = app_root(dom);
    let nav = dom.add(app, El::new("nav"));
    let pim = dom.add(nav, El::new("span").text("PIM"));
    dom.on_click(pim, employee_list_page);
    let buzz = dom.add(nav, El::new("span").text("Buzz"));
    dom.on_click(buzz, buzz_page);
    let recruitment = dom.add(nav, El::new("span").text("Recruitment"));
    dom.on_click(recruitment, candidates_page);
    let main = dom.add(app, El::new("div").class("main"));
    dom.add(main, El::new("h6").text("Dashboard"));
}

// Buzz

#[derive(Debug, Clone, Copy)]
enum Item {
    Post(NodeId),
    Comment(NodeId),
}

impl Item {
    fn node(&self) -> NodeId {
        match self {
            Item::Post(id) | Item::Comment(id) => *id,
        }
    }
}

fn buzz_page(dom: &mut FakeDom) {
    let main = page(dom);
    dom.add(main, El::new("h6").text("Buzz"));
    let form = dom.add(main, El::new("form").class("composer"));
    let input = dom.add(form, El::new("div").class("post-input").editable());
    let photo = dom.add(
        form,
        El::new("button")
            .class("photo")
            .attr("type", "button")
            .text("Share Photos"),
    );
    dom.on_click(photo, move |dom| {
        if dom.select_in(form, "input[type=\"file\"]").is_empty() {
            dom.add(form, El::input().attr("type", "file").hidden());
        }
    });
    let submit = dom.add(
        form,
        El::new("button")
            .attr("type", "submit")
            .text("Post")
            .covered(),
    );

    let feed = dom.add(main, El::new("div").class("feed"));
    build_post(dom, feed, None, "Welcome to the team feed");

    dom.on_click(submit, move |dom| {
        let text = dom.text_of(input);
        if text.trim().is_empty() {
            return;
        }
        dom.set_text(input, "");
        dom.after(ms(800), move |dom| rerender_feed(dom, feed, &text));
    });
}

/// Rebuild every card with the new post on top; previous nodes go stale.
fn rerender_feed(dom: &mut FakeDom, feed: NodeId, new_post: &str) {
    let existing: Vec<String> = dom
        .children(feed)
        .into_iter()
        .filter_map(|post| dom.attr(post, "data-text"))
        .collect();
    for post in dom.children(feed) {
        dom.remove(post);
    }
    build_post(dom, feed, None, new_post);
    for text in existing {
        build_post(dom, feed, None, &text);
    }
}

fn build_post(dom: &mut FakeDom, feed: NodeId, index: Option<usize>, text: &str) -> NodeId {
    let el = El::new("div").class("post").attr("data-text", text);
    let post = match index {
        Some(i) => dom.insert(feed, i, el),
        None => dom.add(feed, el),
    };
    dom.add(post, El::new("p").class("body").text(text));
    let like = dom.add(post, El::new("button").class("like").text("Like"));
    dom.on_click(like, move |dom| toggle_like_later(dom, like));
    let more = dom.add(post, El::new("button").class("more"));
    dom.on_click(more, move |dom| open_menu(dom, Item::Post(post)));
    let toggle = dom.add(
        post,
        El::new("button").class("comment-toggle").text("Comment"),
    );
    let comments = dom.add(post, El::new("div").class("comments"));
    dom.on_click(toggle, move |dom| open_comment_box(dom, post, comments));
    post
}

fn build_comment(dom: &mut FakeDom, comments: NodeId, index: Option<usize>, text: &str) -> NodeId {
    let el = El::new("div").class("comment").attr("data-text", text);
    let comment = match index {
        Some(i) => dom.insert(comments, i, el),
        None => dom.add(comments, el),
    };
    dom.add(comment, El::new("p").text(text));
    let like = dom.add(comment, El::new("button").class("like").text("Like"));
    dom.on_click(like, move |dom| toggle_like_later(dom, like));
    let more = dom.add(comment, El::new("button").class("more"));
    dom.on_click(more, move |dom| open_menu(dom, Item::Comment(comment)));
    comment
}

fn toggle_like_later(dom: &mut FakeDom, like: NodeId) {
    dom.after(ms(200), move |dom| {
        let next = if dom.text_of(like) == "Like" { "Unlike" } else { "Like" };
        dom.set_text(like, next);
    });
}

fn open_menu(dom: &mut FakeDom, item: Item) {
    dom.remove_all("div.dropdown");
    let app = app_root(dom);
    let menu = dom.add(app, El::new("div").class("dropdown"));
    let edit = dom.add(menu, El::new("p").text("Edit"));
    let delete = dom.add(menu, El::new("p").text("Delete"));
    dom.on_click(edit, move |dom| {
        dom.remove(menu);
        match item {
            Item::Post(post) => edit_post_modal(dom, post),
            Item::Comment(comment) => edit_comment_box(dom, comment),
        }
    });
    dom.on_click(delete, move |dom| {
        dom.remove(menu);
        confirm_dialog(dom, item.node());
    });
}

fn edit_post_modal(dom: &mut FakeDom, post: NodeId) {
    let app = app_root(dom);
    let current = dom.attr(post, "data-text").unwrap_or_default();
    let modal = dom.add(app, El::new("div").class("modal"));
    let input = dom.add(
        modal,
        El::new("div").class("post-input").editable().text(&current),
    );
    let save = dom.add(modal, El::new("button").attr("type", "submit").text("Save"));
    dom.on_click(save, move |dom| {
        let text = dom.text_of(input);
        dom.remove(modal);
        dom.after(ms(500), move |dom| replace_item(dom, Item::Post(post), &text));
    });
}

fn edit_comment_box(dom: &mut FakeDom, comment: NodeId) {
    dom.remove_all("div.comment-box");
    let current = dom.attr(comment, "data-text").unwrap_or_default();
    let edit_box = dom.add(comment, El::new("div").class("comment-box"));
    let area = dom.add(edit_box, El::textarea().value(&current));
    dom.on_key(area, move |dom, key| {
        if key != SpecialKey::Enter {
            return;
        }
        let text = dom.value(area).unwrap_or_default();
        dom.after(ms(300), move |dom| {
            replace_item(dom, Item::Comment(comment), &text)
        });
    });
}

/// Re-render one card in place with new text.
fn replace_item(dom: &mut FakeDom, item: Item, text: &str) {
    let node = item.node();
    if !dom.is_attached(node) {
        return;
    }
    let Some(parent) = dom.parent(node) else {
        return;
    };
    let index = dom.index_in_parent(node);
    dom.remove(node);
    match item {
        Item::Post(_) => {
            build_post(dom, parent, Some(index), text);
        }
        Item::Comment(_) => {
            build_comment(dom, parent, Some(index), text);
        }
    }
}

fn open_comment_box(dom: &mut FakeDom, post: NodeId, comments: NodeId) {
    if !dom.select_in(post, "div.comment-box").is_empty() {
        return;
    }
    let comment_box = dom.add(post, El::new("div").class("comment-box"));
    let area = dom.add(comment_box, El::textarea());
    dom.on_key(area, move |dom, key| {
        if key != SpecialKey::Enter {
            return;
        }
        let text = dom.value(area).unwrap_or_default();
        if text.trim().is_empty() {
            return;
        }
        dom.set_value(area, "");
        dom.after(ms(300), move |dom| {
            build_comment(dom, comments, None, &text);
        });
    });
}

fn confirm_dialog(dom: &mut FakeDom, node: NodeId) {
    let app = app_root(dom);
    let dialog = dom.add(app, El::new("div").class("dialog"));
    dom.add(dialog, El::new("button").attr("type", "button").text("No, Cancel"));
    let yes = dom.add(
        dialog,
        El::new("button").attr("type", "button").text("Yes, Delete"),
    );
    dom.on_click(yes, move |dom| {
        dom.remove(dialog);
        dom.after(ms(500), move |dom| {
            if dom.is_attached(node) {
                dom.remove(node);
                toast(dom);
            }
        });
    });
}

/// A success toast that fades after two seconds.
fn toast(dom: &mut FakeDom) {
    toast_with(dom, "Successfully Saved");
}

fn toast_with(dom: &mut FakeDom, message: &str) {
    let app = app_root(dom);
    let toast = dom.add(app, El::new("div").class("toast").text(message));
    dom.after(ms(2000), move |dom| {
        if dom.is_attached(toast) {
            dom.remove(toast);
        }
    });
}

// PIM

fn field(dom: &mut FakeDom, parent: NodeId, label: &str, value: &str) -> NodeId {
    let wrapper = dom.add(
        parent,
        El::new("div").class("field").attr("data-label", label),
    );
    dom.add(wrapper, El::new("label").text(label));
    dom.add(wrapper, El::input().value(value))
}

/// A custom dropdown: click opens a listbox; arrow-down + enter on the
/// control picks the first option.
fn select_field(dom: &mut FakeDom, parent: NodeId, label: &str, options: &[&str]) -> NodeId {
    let wrapper = dom.add(
        parent,
        El::new("div").class("field").attr("data-label", label),
    );
    dom.add(wrapper, El::new("label").text(label));
    let control = dom.add(
        wrapper,
        El::new("div").class("select").attr("tabindex", "0").text("-- Select --"),
    );
    let options: Vec<String> = options.iter().map(|o| o.to_string()).collect();
    let for_click = options.clone();
    dom.on_click(control, move |dom| open_listbox(dom, control, &for_click));
    dom.on_key(control, move |dom, key| {
        if key == SpecialKey::Enter
            && !dom.select("div.listbox").is_empty()
            && let Some(first) = options.first()
        {
            dom.set_text(control, first);
            dom.remove_all("div.listbox");
        }
    });
    control
}

fn open_listbox(dom: &mut FakeDom, control: NodeId, options: &[String]) {
    dom.remove_all("div.listbox");
    let app = app_root(dom);
    let listbox = dom.add(app, El::new("div").class("listbox"));
    for label in options {
        let option = dom.add(listbox, El::new("div").class("option").text(label));
        let label = label.clone();
        dom.on_click(option, move |dom| {
            dom.set_text(control, &label);
            dom.remove(listbox);
        });
    }
}

fn submit_button(dom: &mut FakeDom, parent: NodeId, label: &str) -> NodeId {
    dom.add(parent, El::new("button").attr("type", "submit").text(label))
}

fn employee_list_page(dom: &mut FakeDom) {
    let main = page(dom);
    let top = dom.add(main, El::new("div").class("topbar"));
    let add = dom.add(top, El::new("a").text("Add Employee"));
    dom.on_click(add, add_employee_page);
    let reports = dom.add(top, El::new("a").text("Reports"));
    dom.on_click(reports, reports_list_page);
    dom.add(main, El::new("h5").text("Employee Information"));

    let filters = dom.add(main, El::new("form").class("filters"));
    let name = field(dom, filters, "Employee Name", "");
    let id = field(dom, filters, "Employee Id", "");
    select_field(
        dom,
        filters,
        "Employment Status",
        &["Freelance", "Full-Time Permanent", "Part-Time Internship"],
    );
    let search = submit_button(dom, filters, "Search");

    let table = dom.add(main, El::new("div").class("table-body"));
    render_rows(dom, table, "", "");

    dom.on_click(search, move |dom| {
        let id_filter = dom.value(id).unwrap_or_default();
        let name_filter = dom.value(name).unwrap_or_default();
        dom.after(ms(800), move |dom| {
            for row in dom.children(table) {
                dom.remove(row);
            }
            render_rows(dom, table, &id_filter, &name_filter);
        });
    });
}

/// Substring filters, like the real search: an id filter also matches
/// longer ids that contain it.
fn render_rows(dom: &mut FakeDom, table: NodeId, id_filter: &str, name_filter: &str) {
    let rows: Vec<(String, String)> = dom
        .records
        .iter()
        .filter(|(id, name)| id.contains(id_filter) && name.contains(name_filter))
        .cloned()
        .collect();
    for (id, name) in rows {
        let row = dom.add(table, El::new("div").class("row"));
        dom.add(row, El::new("div").class("cell check"));
        dom.add(row, El::new("div").class("cell id").text(&id));
        dom.add(row, El::new("div").class("cell name").text(&name));
    }
}

fn add_employee_page(dom: &mut FakeDom) {
    let main = page(dom);
    dom.add(main, El::new("h6").text("Add Employee"));
    let form = dom.add(main, El::new("form").class("add-employee"));
    let first = dom.add(form, El::input().attr("name", "firstName"));
    let last = dom.add(form, El::input().attr("name", "lastName"));
    // The form proposes its own id; the workflow has to overwrite it.
    let id = field(dom, form, "Employee Id", "0412");
    dom.add(form, El::input().attr("type", "file").hidden());

    let details = dom.add(form, El::new("div").class("login-details"));
    let toggle = dom.add(form, El::new("span").class("switch"));
    dom.on_click(toggle, move |dom| {
        if dom.children(details).is_empty() {
            field(dom, details, "Username", "");
            field(dom, details, "Password", "");
            field(dom, details, "Confirm Password", "");
        }
    });

    let save = submit_button(dom, form, "Save");
    dom.on_click(save, move |dom| {
        dom.remove_all("span.error-message");
        let first_name = dom.value(first).unwrap_or_default();
        if first_name.trim().is_empty() {
            dom.add(form, El::new("span").class("error-message").text("Required"));
            return;
        }
        let last_name = dom.value(last).unwrap_or_default();
        let employee_id = dom.value(id).unwrap_or_default();
        dom.records
            .push((employee_id, format!("{} {}", first_name, last_name)));
        dom.after(ms(500), details_page);
    });
}

fn detail_tabs(dom: &mut FakeDom, main: NodeId) {
    let tabs = dom.add(main, El::new("div").class("tabs"));
    let job = dom.add(tabs, El::new("a").text("Job"));
    dom.on_click(job, job_page);
    let report_to = dom.add(tabs, El::new("a").text("Report-to"));
    dom.on_click(report_to, report_to_page);
}

fn details_page(dom: &mut FakeDom) {
    let main = page(dom);
    detail_tabs(dom, main);
    dom.add(main, El::new("h6").text("Personal Details"));

    let form = dom.add(main, El::new("form").class("personal"));
    for label in [
        "Nick Name",
        "Other Id",
        "License Number",
        "SSN Number",
        "SIN Number",
        "Military Service",
        "License Expiry Date",
        "Date of Birth",
    ] {
        field(dom, form, label, "");
    }
    select_field(dom, form, "Nationality", &["Afghan", "Albanian"]);
    select_field(dom, form, "Marital Status", &["Single", "Married"]);
    choice(dom, form, "radio", "Male");
    choice(dom, form, "radio", "Female");
    choice(dom, form, "checkbox", "Smoker");
    let save = submit_button(dom, form, "Save");
    dom.on_click(save, |dom| dom.after(ms(300), toast));

    attachments_section(dom, main);
}

/// A labelled radio button or checkbox.
fn choice(dom: &mut FakeDom, parent: NodeId, kind: &str, label: &str) -> NodeId {
    let wrapper = dom.add(
        parent,
        El::new("div").class(kind).attr("data-label", label),
    );
    dom.add(wrapper, El::new("label").text(label));
    dom.add(wrapper, El::input().attr("type", kind))
}

fn attachments_section(dom: &mut FakeDom, main: NodeId) {
    dom.add(main, El::new("h6").text("Attachments"));
    let section = dom.add(main, El::new("div").class("attachments"));
    let add = dom.add(
        section,
        El::new("button").class("add-attachment").text("+ Add"),
    );
    let table = dom.add(section, El::new("div").class("table-body"));
    dom.on_click(add, move |dom| attachment_form(dom, section, table, None));
}

/// Upload form for a new attachment, or comment form for `editing`.
fn attachment_form(dom: &mut FakeDom, section: NodeId, table: NodeId, editing: Option<NodeId>) {
    dom.remove_all("div.attachment-form");
    let form = dom.add(section, El::new("div").class("attachment-form"));
    let file = match editing {
        Some(_) => None,
        None => Some(dom.add(form, El::input().attr("type", "file").hidden())),
    };
    let current = editing
        .and_then(|row| dom.attr(row, "data-comment"))
        .unwrap_or_default();
    let comment = dom.add(form, El::textarea().value(&current));
    let save = submit_button(dom, form, "Save");
    dom.on_click(save, move |dom| {
        dom.remove_all("div.toast");
        let text = dom.value(comment).unwrap_or_default();
        match editing {
            Some(row) => {
                dom.remove(form);
                dom.after(ms(300), move |dom| {
                    if !dom.is_attached(row) {
                        return;
                    }
                    let index = dom.index_in_parent(row);
                    let name = dom.attr(row, "data-file").unwrap_or_default();
                    dom.remove(row);
                    attachment_row(dom, section, table, Some(index), &name, &text);
                    toast(dom);
                });
            }
            None => {
                let path = file.and_then(|f| dom.value(f)).unwrap_or_default();
                let Some(name) = Path::new(&path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                else {
                    dom.add(form, El::new("span").class("error-message").text("Required"));
                    return;
                };
                dom.remove(form);
                dom.after(ms(500), move |dom| {
                    attachment_row(dom, section, table, None, &name, &text);
                    toast(dom);
                });
            }
        }
    });
}

fn attachment_row(
    dom: &mut FakeDom,
    section: NodeId,
    table: NodeId,
    index: Option<usize>,
    name: &str,
    comment: &str,
) -> NodeId {
    let el = El::new("div")
        .class("row")
        .attr("data-file", name)
        .attr("data-comment", comment);
    let row = match index {
        Some(i) => dom.insert(table, i, el),
        None => dom.add(table, el),
    };
    let link = dom.add(row, El::new("a").text(name));
    dom.add(row, El::new("div").class("cell comment").text(comment));
    let edit = dom.add(row, El::new("button").class("edit").text("Edit"));
    let delete = dom.add(row, El::new("button").class("delete").text("Delete"));

    let file_name = name.to_string();
    dom.on_click(link, move |dom| download(dom, &file_name));
    dom.on_click(edit, move |dom| attachment_form(dom, section, table, Some(row)));
    dom.on_click(delete, move |dom| confirm_dialog(dom, row));
    row
}

/// The browser saves the file under its own name in the download dir.
/// Written at once: scheduled mutations only run on driver calls, and the
/// download wait polls the filesystem.
fn download(dom: &mut FakeDom, name: &str) {
    if let Some(dir) = &dom.download_dir {
        std::fs::write(dir.join(name), b"attachment body").unwrap();
    }
}

fn job_page(dom: &mut FakeDom) {
    let main = page(dom);
    detail_tabs(dom, main);
    dom.add(main, El::new("h6").text("Job Details"));
    let loader = dom.add(main, El::new("div").class("form-loader"));
    dom.after(ms(1000), move |dom| dom.remove(loader));

    let form = dom.add(main, El::new("form").class("job"));
    field(dom, form, "Joined Date", "");
    select_field(dom, form, "Job Title", &["Account Assistant", "QA Engineer"]);
    select_field(dom, form, "Job Category", &["Craft Workers", "Professionals"]);
    select_field(dom, form, "Location", &["New York Sales Office", "Texas R&D"]);
    select_field(
        dom,
        form,
        "Employment Status",
        &["Freelance", "Full-Time Permanent"],
    );
    let save = submit_button(dom, form, "Save");
    dom.on_click(save, |dom| dom.after(ms(300), toast));
}

/// The supervisor autocomplete never offers suggestions here.
fn report_to_page(dom: &mut FakeDom) {
    let main = page(dom);
    detail_tabs(dom, main);
    dom.add(main, El::new("h6").text("Report to"));
    let add = dom.add(main, El::new("button").class("add-supervisor").text("+ Add"));
    dom.on_click(add, move |dom| {
        let form = dom.add(main, El::new("form").class("supervisor"));
        dom.add(
            form,
            El::input().attr("placeholder", "Type for hints..."),
        );
        submit_button(dom, form, "Save");
    });
}

// PIM reports

/// Display field groups in the order the group dropdown offers them.
/// "Contact Details" is not offered, and "Custom Fields" has no fields.
const REPORT_GROUPS: [(&str, &[&str]); 4] = [
    ("Custom Fields", &[]),
    (
        "Personal",
        &[
            "Employee Id",
            "Employee First Name",
            "Employee Last Name",
            "Date of Birth",
            "Gender",
            "Nationality",
        ],
    ),
    ("Job", &["Job Title", "Employment Status", "Location"]),
    ("Salary", &["Pay Grade", "Salary Component"]),
];

const UNSELECTED: &str = "-- Select --";

fn reports_list_page(dom: &mut FakeDom) {
    let main = page(dom);
    dom.add(main, El::new("h6").text("Employee Reports"));
    let add = dom.add(main, El::new("button").class("add-report").text("+ Add"));
    dom.on_click(add, define_report_page);
    let list = dom.add(main, El::new("div").class("report-list"));
    let names: Vec<String> = dom.reports.iter().map(|r| r.name.clone()).collect();
    for name in names {
        dom.add(list, El::new("div").class("report").text(&name));
    }
}

fn define_report_page(dom: &mut FakeDom) {
    let main = page(dom);
    dom.add(main, El::new("h6").text("Define Report"));
    let form = dom.add(main, El::new("form").class("define-report"));
    let name = field(dom, form, "Report Name", "");
    let include = select_field(
        dom,
        form,
        "Include",
        &[
            "Current Employees Only",
            "Current and Past Employees",
            "Past Employees Only",
        ],
    );

    let criteria_select = select_field(
        dom,
        form,
        "Selection Criteria",
        &["Employee Name", "Pay Grade", "Education", "Location"],
    );
    let add_criteria = dom.add(
        form,
        El::new("button").attr("type", "button").class("add-criteria").text("Add Criteria"),
    );
    let criteria = dom.add(form, El::new("div").class("criteria"));
    dom.on_click(add_criteria, move |dom| {
        let chosen = dom.text_of(criteria_select);
        if chosen == UNSELECTED {
            return;
        }
        dom.set_text(criteria_select, UNSELECTED);
        let row = dom.add(criteria, El::new("div").class("criteria-row").text(&chosen));
        let delete = dom.add(row, El::new("button").class("criteria-delete"));
        dom.on_click(delete, move |dom| {
            dom.after(ms(300), move |dom| {
                if dom.is_attached(row) {
                    dom.remove(row);
                }
            });
        });
    });

    let (group_select, field_select) = display_field_selects(dom, form);
    let add_field = dom.add(
        form,
        El::new("button")
            .attr("type", "button")
            .class("add-display-field")
            .text("Add Display Field"),
    );
    let table = dom.add(form, El::new("div").class("display-table"));
    dom.on_click(add_field, move |dom| {
        let chosen = dom.text_of(field_select);
        let group = dom.text_of(group_select);
        if chosen == UNSELECTED {
            return;
        }
        dom.set_text(field_select, UNSELECTED);
        let block = match dom
            .select_in(table, &format!("div.group[data-group=\"{}\"]", group))
            .first()
        {
            Some(block) => *block,
            None => {
                let block = dom.add(table, El::new("div").class("group").attr("data-group", &group));
                dom.add(block, El::new("label").text("Include Header"));
                dom.add(block, El::input().attr("type", "checkbox"));
                block
            }
        };
        let row = dom.add(
            block,
            El::new("div").class("display-row").attr("data-field", &chosen).text(&chosen),
        );
        let delete = dom.add(row, El::new("button").class("delete").text("Delete"));
        dom.on_click(delete, move |dom| {
            dom.after(ms(300), move |dom| {
                if dom.is_attached(row) {
                    dom.remove(row);
                }
            });
        });
    });

    let save = submit_button(dom, form, "Save");
    dom.on_click(save, move |dom| {
        dom.remove_all("span.error-message");
        let report_name = dom.value(name).unwrap_or_default();
        if report_name.trim().is_empty() {
            dom.add(form, El::new("span").class("error-message").text("Required"));
            return;
        }
        let columns = dom
            .select_in(table, "div.display-row")
            .into_iter()
            .filter_map(|row| dom.attr(row, "data-field"))
            .collect();
        let headers_checked = dom
            .select_in(table, "input[type=\"checkbox\"]")
            .into_iter()
            .filter(|checkbox| dom.is_selected(*checkbox))
            .count();
        let saved = SavedReport {
            name: report_name,
            include: dom.text_of(include),
            criteria: dom.select_in(criteria, "div.criteria-row").len(),
            columns,
            headers_checked,
        };
        dom.reports.push(saved);
        dom.after(ms(500), reports_list_page);
    });
}

/// The group dropdown and the field dropdown under "Display Fields". The
/// field list follows the selected group.
fn display_field_selects(dom: &mut FakeDom, form: NodeId) -> (NodeId, NodeId) {
    let wrapper = dom.add(
        form,
        El::new("div").class("field").attr("data-label", "Display Fields"),
    );
    dom.add(wrapper, El::new("label").text("Display Fields"));
    let group_select = dom.add(
        wrapper,
        El::new("div").class("select group").text(UNSELECTED),
    );
    let field_select = dom.add(
        wrapper,
        El::new("div").class("select fields").text(UNSELECTED),
    );

    let groups: Vec<String> = REPORT_GROUPS.iter().map(|(g, _)| g.to_string()).collect();
    dom.on_click(group_select, move |dom| {
        dom.set_text(field_select, UNSELECTED);
        open_listbox(dom, group_select, &groups);
    });
    dom.on_click(field_select, move |dom| {
        let group = dom.text_of(group_select);
        let fields: Vec<String> = REPORT_GROUPS
            .iter()
            .find(|(g, _)| *g == group)
            .map(|(_, fields)| fields.iter().map(|f| f.to_string()).collect())
            .unwrap_or_default();
        open_listbox(dom, field_select, &fields);
    });
    (group_select, field_select)
}

// Recruitment

const VACANCIES: [&str; 2] = ["Junior Account Assistant", "Senior QA Lead"];
const INTERVIEWERS: [&str; 3] = ["Linda Anderson", "Odis Adalwin", "Paul Collings"];
const PROPOSED_APPLICATION_DATE: &str = "2026-03-14";

fn candidates_page(dom: &mut FakeDom) {
    let main = page(dom);
    dom.add(main, El::new("h5").text("Candidates"));
    let add = dom.add(main, El::new("button").class("add-candidate").text("+ Add"));
    dom.on_click(add, add_candidate_page);
}

fn textarea_field(dom: &mut FakeDom, parent: NodeId, label: &str) -> NodeId {
    let wrapper = dom.add(
        parent,
        El::new("div").class("field").attr("data-label", label),
    );
    dom.add(wrapper, El::new("label").text(label));
    dom.add(wrapper, El::textarea())
}

/// The form proposes today's application date, and its save button sits
/// under the sticky footer.
fn add_candidate_page(dom: &mut FakeDom) {
    let main = page(dom);
    dom.add(main, El::new("h6").text("Add Candidate"));
    let form = dom.add(main, El::new("form").class("add-candidate"));
    let first = dom.add(form, El::input().attr("name", "firstName"));
    let middle = dom.add(form, El::input().attr("name", "middleName"));
    let last = dom.add(form, El::input().attr("name", "lastName"));
    let email = field(dom, form, "Email", "");
    field(dom, form, "Contact Number", "");
    let vacancy = select_field(dom, form, "Vacancy", &VACANCIES);
    field(dom, form, "Keywords", "");
    let applied = field(dom, form, "Date of Application", PROPOSED_APPLICATION_DATE);
    textarea_field(dom, form, "Notes");
    let consent = choice(dom, form, "checkbox", "Consent to keep data");
    let resume = dom.add(form, El::input().attr("type", "file").hidden());
    let save = dom.add(
        form,
        El::new("button")
            .attr("type", "submit")
            .text("Save")
            .covered(),
    );

    dom.on_click(save, move |dom| {
        dom.remove_all("span.error-message");
        let name: Vec<String> = [first, middle, last]
            .into_iter()
            .filter_map(|id| dom.value(id))
            .filter(|part| !part.trim().is_empty())
            .collect();
        let address = dom.value(email).unwrap_or_default();
        if name.is_empty() || address.trim().is_empty() {
            dom.add(form, El::new("span").class("error-message").text("Required"));
            return;
        }
        let picked = dom.text_of(vacancy);
        let resume = dom.value(resume).and_then(|path| {
            Path::new(&path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        });
        let candidate = SavedCandidate {
            name: name.join(" "),
            email: address,
            vacancy: if picked == UNSELECTED { String::new() } else { picked },
            applied_on: dom.value(applied).unwrap_or_default(),
            consent: dom.is_selected(consent),
            resume,
            stage: "Application Initiated".into(),
            history: Vec::new(),
        };
        dom.candidates.push(candidate);
        let index = dom.candidates.len() - 1;
        dom.after(ms(500), move |dom| candidate_page(dom, index));
    });
}

/// Offers the next stage action for the candidate's current stage.
fn candidate_page(dom: &mut FakeDom, index: usize) {
    let main = page(dom);
    dom.add(main, El::new("h6").text("Application Stage"));
    let stage = dom.candidates[index].stage.clone();
    dom.add(main, El::new("p").class("stage").text(&stage));
    let actions = dom.add(main, El::new("div").class("actions"));
    let next = match stage.as_str() {
        "Application Initiated" => Some("Shortlist"),
        "Shortlisted" => Some("Schedule Interview"),
        _ => None,
    };
    if let Some(action) = next {
        let button = dom.add(
            actions,
            El::new("button").attr("type", "button").text(action),
        );
        dom.on_click(button, move |dom| match action {
            "Shortlist" => shortlist_form(dom, index),
            _ => interview_form(dom, index),
        });
    }
}

/// A rejected action answers with an error toast and leaves the stage as is.
fn shortlist_form(dom: &mut FakeDom, index: usize) {
    let main = page(dom);
    dom.add(main, El::new("h6").text("Shortlist Candidate"));
    let form = dom.add(main, El::new("form").class("stage-action"));
    let notes = textarea_field(dom, form, "Notes");
    let save = submit_button(dom, form, "Save");
    dom.on_click(save, move |dom| {
        if dom.rejected_actions.iter().any(|a| a == "Shortlist") {
            dom.after(ms(300), move |dom| {
                candidate_page(dom, index);
                toast_with(dom, "Unexpected Error");
            });
            return;
        }
        let text = dom.value(notes).unwrap_or_default();
        let candidate = &mut dom.candidates[index];
        candidate.stage = "Shortlisted".into();
        candidate.history.push(format!("Shortlisted: {}", text));
        dom.after(ms(300), move |dom| {
            candidate_page(dom, index);
            toast(dom);
        });
    });
}

fn interview_form(dom: &mut FakeDom, index: usize) {
    let main = page(dom);
    dom.add(main, El::new("h6").text("Schedule Interview"));
    let form = dom.add(main, El::new("form").class("stage-action"));
    let title = field(dom, form, "Interview Title", "");
    let interviewer = field(dom, form, "Interviewer", "");
    dom.on_input(interviewer, move |dom| interviewer_hints(dom, interviewer));
    let date = field(dom, form, "Date", "");
    let time = field(dom, form, "Time", "");
    let save = submit_button(dom, form, "Save");

    dom.on_click(save, move |dom| {
        dom.remove_all("span.error-message");
        let title = dom.value(title).unwrap_or_default();
        let picked = dom.attr(interviewer, "data-picked").unwrap_or_default();
        if title.trim().is_empty() || picked.is_empty() {
            dom.add(form, El::new("span").class("error-message").text("Required"));
            return;
        }
        let when = format!(
            "{} {}",
            dom.value(date).unwrap_or_default(),
            dom.value(time).unwrap_or_default()
        );
        let candidate = &mut dom.candidates[index];
        candidate.stage = "Interview Scheduled".into();
        candidate
            .history
            .push(format!("Interview: {} with {} on {}", title, picked, when));
        dom.after(ms(300), move |dom| {
            candidate_page(dom, index);
            toast(dom);
        });
    });
}

/// Suggestions for the typed text. Only a picked suggestion counts as a
/// chosen interviewer.
fn interviewer_hints(dom: &mut FakeDom, input: NodeId) {
    dom.remove_all("div.listbox");
    let typed = dom.value(input).unwrap_or_default().trim().to_lowercase();
    let app = app_root(dom);
    let listbox = dom.add(app, El::new("div").class("listbox"));
    for name in INTERVIEWERS
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&typed))
    {
        let option = dom.add(listbox, El::new("div").class("option"));
        let span = dom.add(option, El::new("span").text(name));
        dom.on_click(span, move |dom| {
            dom.set_value(input, name);
            dom.set_attr(input, "data-picked", name);
            dom.remove(listbox);
        });
    }
}
