//! Models the MarkUs API (https://github.com/MarkUsProject/Markus/wiki/RESTful-API).

use super::MarkusClient;
use crate::{
    error::MarkusClientResult,
    path::resource_path,
    request::{
        resolve_mime_type, Annotation, MarksSpreadsheetUpdate, NewMarksSpreadsheet, NewUser,
        Params, StarterFileGroupUpdate,
    },
    response::{ApiResponse, FeedbackFile, ResponseFormat},
};
use reqwest::{
    blocking::multipart::{Form, Part},
    Method,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

// assignments/{assignment_id}/groups[/{group_id}]/...
fn group_path(
    assignment_id: u64,
    group_id: Option<u64>,
    rest: &[(&str, Option<u64>)],
) -> String {
    resource_path(
        [("assignments", Some(assignment_id)), ("groups", group_id)]
            .into_iter()
            .chain(rest.iter().copied()),
    )
}

// assignments/{assignment_id}/starter_file_groups/{starter_file_group_id}/...
fn starter_file_group_path(
    assignment_id: u64,
    starter_file_group_id: u64,
    rest: &[(&str, Option<u64>)],
) -> String {
    resource_path(
        [
            ("assignments", Some(assignment_id)),
            ("starter_file_groups", Some(starter_file_group_id)),
        ]
        .into_iter()
        .chain(rest.iter().copied()),
    )
}

// the uploaded file is always sent in the file_content part,
// its full path goes in the filename parameter
fn file_content_form(filename: &str, contents: Vec<u8>) -> Form {
    let base_name = filename.rsplit('/').next().unwrap_or(filename);
    Form::new().part(
        "file_content",
        Part::bytes(contents).file_name(base_name.to_string()),
    )
}

fn repo_files_params(filename: Option<&str>, collected: bool) -> Params {
    let mut params = Params::new();
    if collected {
        params.push("collected", true);
    }
    if let Some(filename) = filename.filter(|f| !f.is_empty()) {
        params.push("filename", filename);
    }
    params
}

/// Users.
impl MarkusClient {
    /// get /api/users
    /// Returns every user in the MarkUs instance.
    pub fn get_all_users(&self) -> MarkusClientResult<ApiResponse> {
        self.request(Method::GET, "users", ResponseFormat::Json)?
            .send()
    }

    /// post /api/users
    /// Adds a new user to the MarkUs instance.
    pub fn new_user(&self, user: &NewUser) -> MarkusClientResult<ApiResponse> {
        let params = Params::from_serialize(user)?;
        self.request(Method::POST, "users", ResponseFormat::Json)?
            .query(&params)
            .send()
    }
}

/// Assignments and groups.
impl MarkusClient {
    /// get /api/assignments
    pub fn get_assignments(&self) -> MarkusClientResult<ApiResponse> {
        self.request(Method::GET, "assignments", ResponseFormat::Json)?
            .send()
    }

    /// get /api/assignments/{assignment_id}/groups
    pub fn get_groups(&self, assignment_id: u64) -> MarkusClientResult<ApiResponse> {
        let path = group_path(assignment_id, None, &[]);
        self.request(Method::GET, &path, ResponseFormat::Json)?
            .send()
    }

    /// get /api/assignments/{assignment_id}/groups/group_ids_by_name
    /// Returns an object mapping group names to group ids.
    pub fn get_groups_by_name(&self, assignment_id: u64) -> MarkusClientResult<ApiResponse> {
        let path = group_path(assignment_id, None, &[("group_ids_by_name", None)]);
        self.request(Method::GET, &path, ResponseFormat::Json)?
            .send()
    }

    /// get /api/assignments/{assignment_id}/groups/{group_id}
    pub fn get_group(&self, assignment_id: u64, group_id: u64) -> MarkusClientResult<ApiResponse> {
        let path = group_path(assignment_id, Some(group_id), &[]);
        self.request(Method::GET, &path, ResponseFormat::Json)?
            .send()
    }

    /// get /api/assignments/{assignment_id}/grades_summary
    /// Returns the grades summary CSV as text.
    pub fn get_grades_summary(&self, assignment_id: u64) -> MarkusClientResult<ApiResponse> {
        let path = resource_path([
            ("assignments", Some(assignment_id)),
            ("grades_summary", None),
        ]);
        self.request(Method::GET, &path, ResponseFormat::Text)?
            .send()
    }
}

/// Feedback files.
impl MarkusClient {
    /// get /api/assignments/{assignment_id}/groups/{group_id}/feedback_files
    pub fn get_feedback_files(
        &self,
        assignment_id: u64,
        group_id: u64,
    ) -> MarkusClientResult<ApiResponse> {
        let path = group_path(assignment_id, Some(group_id), &[("feedback_files", None)]);
        self.request(Method::GET, &path, ResponseFormat::Json)?
            .send()
    }

    /// get /api/assignments/{assignment_id}/groups/{group_id}/feedback_files/{feedback_file_id}
    /// Returns the raw content of the feedback file.
    pub fn get_feedback_file(
        &self,
        assignment_id: u64,
        group_id: u64,
        feedback_file_id: u64,
    ) -> MarkusClientResult<ApiResponse> {
        let path = group_path(
            assignment_id,
            Some(group_id),
            &[("feedback_files", Some(feedback_file_id))],
        );
        self.request(Method::GET, &path, ResponseFormat::Content)?
            .send()
    }

    /// post /api/assignments/{assignment_id}/groups/{group_id}/feedback_files
    /// put /api/assignments/{assignment_id}/groups/{group_id}/feedback_files/{feedback_file_id}
    ///
    /// Uploads a feedback file. The title is the file name shown in MarkUs and needs an
    /// extension unless `mime_type` is given. With `overwrite`, a feedback file with the
    /// same name is replaced instead of adding a second one.
    ///
    /// The existence check and the upload are separate requests, so concurrent uploads of the
    /// same title may both create a new file.
    ///
    /// # Errors
    /// If no MIME type is given and none can be guessed from the title. This is checked
    /// before any request is made.
    pub fn upload_feedback_file(
        &self,
        assignment_id: u64,
        group_id: u64,
        title: &str,
        contents: impl Into<Vec<u8>>,
        mime_type: Option<&str>,
        overwrite: bool,
    ) -> MarkusClientResult<ApiResponse> {
        let mime_type = resolve_mime_type(mime_type, title)?;

        let mut existing_id = None;
        if overwrite {
            let feedback_files = self.get_feedback_files(assignment_id, group_id)?;
            if !feedback_files.is_success() {
                return Ok(feedback_files);
            }
            existing_id = feedback_files
                .deserialize::<Vec<FeedbackFile>>()?
                .into_iter()
                .find(|f| f.filename == title)
                .map(|f| f.id);
        }

        let (method, path) = match existing_id {
            Some(id) => {
                log::debug!("replacing feedback file {id} ({title})");
                (
                    Method::PUT,
                    group_path(assignment_id, Some(group_id), &[("feedback_files", Some(id))]),
                )
            }
            None => (
                Method::POST,
                group_path(assignment_id, Some(group_id), &[("feedback_files", None)]),
            ),
        };
        let mut params = Params::new();
        params.push("filename", title).push("mime_type", mime_type);
        self.request(method, &path, ResponseFormat::Json)?
            .query(&params)
            .multipart(file_content_form(title, contents.into()))
            .send()
    }
}

/// Marks spreadsheets.
impl MarkusClient {
    /// get /api/grade_entry_forms
    pub fn get_marks_spreadsheets(&self) -> MarkusClientResult<ApiResponse> {
        self.request(Method::GET, "grade_entry_forms", ResponseFormat::Json)?
            .send()
    }

    /// get /api/grade_entry_forms/{grade_entry_form_id}
    /// Returns the spreadsheet as CSV text.
    pub fn get_marks_spreadsheet(&self, spreadsheet_id: u64) -> MarkusClientResult<ApiResponse> {
        let path = resource_path([("grade_entry_forms", Some(spreadsheet_id))]);
        self.request(Method::GET, &path, ResponseFormat::Text)?
            .send()
    }

    /// post /api/grade_entry_forms
    pub fn new_marks_spreadsheet(
        &self,
        spreadsheet: &NewMarksSpreadsheet,
    ) -> MarkusClientResult<ApiResponse> {
        let params = Params::from_serialize(spreadsheet)?;
        self.request(Method::POST, "grade_entry_forms", ResponseFormat::Json)?
            .query(&params)
            .send()
    }

    /// put /api/grade_entry_forms/{grade_entry_form_id}
    pub fn update_marks_spreadsheet(
        &self,
        spreadsheet_id: u64,
        update: &MarksSpreadsheetUpdate,
    ) -> MarkusClientResult<ApiResponse> {
        let path = resource_path([("grade_entry_forms", Some(spreadsheet_id))]);
        let params = Params::from_serialize(update)?;
        self.request(Method::PUT, &path, ResponseFormat::Json)?
            .query(&params)
            .send()
    }

    /// put /api/grade_entry_forms/{grade_entry_form_id}/update_grades
    /// Sets a student's grade for each named column.
    pub fn update_marks_spreadsheets_grades(
        &self,
        spreadsheet_id: u64,
        user_name: &str,
        grades_per_column: &HashMap<String, f64>,
    ) -> MarkusClientResult<ApiResponse> {
        let path = resource_path([
            ("grade_entry_forms", Some(spreadsheet_id)),
            ("update_grades", None),
        ]);
        let body = json!({
            "user_name": user_name,
            "grade_entry_items": grades_per_column,
        });
        self.request(Method::PUT, &path, ResponseFormat::Json)?
            .json(&body)
            .send()
    }
}

/// Test results, annotations and marks.
impl MarkusClient {
    /// post /api/assignments/{assignment_id}/groups/{group_id}/test_group_results
    /// A `test_output` that is not a JSON string is sent as its JSON serialization.
    pub fn upload_test_group_results(
        &self,
        assignment_id: u64,
        group_id: u64,
        test_run_id: u64,
        test_output: &Value,
    ) -> MarkusClientResult<ApiResponse> {
        let path = group_path(assignment_id, Some(group_id), &[("test_group_results", None)]);
        let test_output = match test_output {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let body = json!({
            "test_run_id": test_run_id,
            "test_output": test_output,
        });
        self.request(Method::POST, &path, ResponseFormat::Json)?
            .json(&body)
            .send()
    }

    /// post /api/assignments/{assignment_id}/groups/{group_id}/add_annotations
    /// Only works for plain-text submission files.
    pub fn upload_annotations(
        &self,
        assignment_id: u64,
        group_id: u64,
        annotations: &[Annotation],
        force_complete: bool,
    ) -> MarkusClientResult<ApiResponse> {
        let path = group_path(assignment_id, Some(group_id), &[("add_annotations", None)]);
        let body = json!({
            "annotations": annotations,
            "force_complete": force_complete,
        });
        self.request(Method::POST, &path, ResponseFormat::Json)?
            .json(&body)
            .send()
    }

    /// get /api/assignments/{assignment_id}/groups[/{group_id}]/annotations
    /// Returns the annotations of the assignment, or only those of one group.
    pub fn get_annotations(
        &self,
        assignment_id: u64,
        group_id: Option<u64>,
    ) -> MarkusClientResult<ApiResponse> {
        let path = group_path(assignment_id, group_id, &[("annotations", None)]);
        self.request(Method::GET, &path, ResponseFormat::Json)?
            .send()
    }

    /// put /api/assignments/{assignment_id}/groups/{group_id}/update_marks
    ///
    /// Updates the marks of a single group. Only the criteria in the map are changed.
    /// Criteria are named by their title exactly as in MarkUs, and the marks are numbers or
    /// `"nil"` to unset a mark. Rubric criteria take the rubric level.
    pub fn update_marks_single_group(
        &self,
        criteria_mark_map: &Map<String, Value>,
        assignment_id: u64,
        group_id: u64,
    ) -> MarkusClientResult<ApiResponse> {
        let path = group_path(assignment_id, Some(group_id), &[("update_marks", None)]);
        self.request(Method::PUT, &path, ResponseFormat::Json)?
            .json(criteria_mark_map)
            .send()
    }

    /// put /api/assignments/{assignment_id}/groups/{group_id}/update_marking_state
    pub fn update_marking_state(
        &self,
        assignment_id: u64,
        group_id: u64,
        new_marking_state: &str,
    ) -> MarkusClientResult<ApiResponse> {
        let path = group_path(
            assignment_id,
            Some(group_id),
            &[("update_marking_state", None)],
        );
        let mut params = Params::new();
        params.push("marking_state", new_marking_state);
        self.request(Method::PUT, &path, ResponseFormat::Json)?
            .query(&params)
            .send()
    }

    /// post /api/assignments/{assignment_id}/groups/{group_id}/create_extra_marks
    pub fn create_extra_marks(
        &self,
        assignment_id: u64,
        group_id: u64,
        extra_marks: f64,
        description: &str,
    ) -> MarkusClientResult<ApiResponse> {
        let path = group_path(assignment_id, Some(group_id), &[("create_extra_marks", None)]);
        let mut params = Params::new();
        params
            .push("extra_marks", extra_marks)
            .push("description", description);
        self.request(Method::POST, &path, ResponseFormat::Json)?
            .query(&params)
            .send()
    }

    /// delete /api/assignments/{assignment_id}/groups/{group_id}/remove_extra_marks
    pub fn remove_extra_marks(
        &self,
        assignment_id: u64,
        group_id: u64,
        extra_marks: f64,
        description: &str,
    ) -> MarkusClientResult<ApiResponse> {
        let path = group_path(assignment_id, Some(group_id), &[("remove_extra_marks", None)]);
        let mut params = Params::new();
        params
            .push("extra_marks", extra_marks)
            .push("description", description);
        self.request(Method::DELETE, &path, ResponseFormat::Json)?
            .query(&params)
            .send()
    }
}

/// Submission repositories.
impl MarkusClient {
    /// get /api/assignments/{assignment_id}/groups/{group_id}/submission_files
    ///
    /// Returns the content of a single submitted file when `filename` is given, otherwise a
    /// zip file of all of the group's submission files. With `collected`, the collected
    /// version of the files is returned instead of the latest one.
    pub fn get_files_from_repo(
        &self,
        assignment_id: u64,
        group_id: u64,
        filename: Option<&str>,
        collected: bool,
    ) -> MarkusClientResult<ApiResponse> {
        let path = group_path(assignment_id, Some(group_id), &[("submission_files", None)]);
        self.request(Method::GET, &path, ResponseFormat::Content)?
            .query(&repo_files_params(filename, collected))
            .send()
    }

    /// post /api/assignments/{assignment_id}/groups/{group_id}/submission_files/create_folders
    pub fn upload_folder_to_repo(
        &self,
        assignment_id: u64,
        group_id: u64,
        folder_path: &str,
    ) -> MarkusClientResult<ApiResponse> {
        let path = group_path(
            assignment_id,
            Some(group_id),
            &[("submission_files", None), ("create_folders", None)],
        );
        let mut params = Params::new();
        params.push("folder_path", folder_path);
        self.request(Method::POST, &path, ResponseFormat::Json)?
            .query(&params)
            .send()
    }

    /// post /api/assignments/{assignment_id}/groups/{group_id}/submission_files
    ///
    /// Uploads a file to the group's repository. `file_path` is relative to the assignment
    /// directory: to upload `A1/somesubdir/myfile.txt` for assignment A1, pass
    /// `somesubdir/myfile.txt`.
    ///
    /// # Errors
    /// If no MIME type is given and none can be guessed from the path. This is checked
    /// before any request is made.
    pub fn upload_file_to_repo(
        &self,
        assignment_id: u64,
        group_id: u64,
        file_path: &str,
        contents: impl Into<Vec<u8>>,
        mime_type: Option<&str>,
    ) -> MarkusClientResult<ApiResponse> {
        let mime_type = resolve_mime_type(mime_type, file_path)?;
        let path = group_path(assignment_id, Some(group_id), &[("submission_files", None)]);
        let mut params = Params::new();
        params
            .push("filename", file_path)
            .push("mime_type", mime_type);
        self.request(Method::POST, &path, ResponseFormat::Json)?
            .query(&params)
            .multipart(file_content_form(file_path, contents.into()))
            .send()
    }

    /// delete /api/assignments/{assignment_id}/groups/{group_id}/submission_files/remove_file
    /// `file_path` is relative to the assignment directory.
    pub fn remove_file_from_repo(
        &self,
        assignment_id: u64,
        group_id: u64,
        file_path: &str,
    ) -> MarkusClientResult<ApiResponse> {
        let path = group_path(
            assignment_id,
            Some(group_id),
            &[("submission_files", None), ("remove_file", None)],
        );
        let mut params = Params::new();
        params.push("filename", file_path);
        self.request(Method::DELETE, &path, ResponseFormat::Json)?
            .query(&params)
            .send()
    }

    /// delete /api/assignments/{assignment_id}/groups/{group_id}/submission_files/remove_folder
    /// Removes the folder and everything in it. `folder_path` is relative to the assignment directory.
    pub fn remove_folder_from_repo(
        &self,
        assignment_id: u64,
        group_id: u64,
        folder_path: &str,
    ) -> MarkusClientResult<ApiResponse> {
        let path = group_path(
            assignment_id,
            Some(group_id),
            &[("submission_files", None), ("remove_folder", None)],
        );
        let mut params = Params::new();
        params.push("folder_path", folder_path);
        self.request(Method::DELETE, &path, ResponseFormat::Json)?
            .query(&params)
            .send()
    }
}

/// Automated tests.
impl MarkusClient {
    /// get /api/assignments/{assignment_id}/test_specs
    pub fn get_test_specs(&self, assignment_id: u64) -> MarkusClientResult<ApiResponse> {
        let path = resource_path([("assignments", Some(assignment_id)), ("test_specs", None)]);
        self.request(Method::GET, &path, ResponseFormat::Json)?
            .send()
    }

    /// post /api/assignments/{assignment_id}/update_test_specs
    pub fn update_test_specs(
        &self,
        assignment_id: u64,
        specs: &Value,
    ) -> MarkusClientResult<ApiResponse> {
        let path = resource_path([
            ("assignments", Some(assignment_id)),
            ("update_test_specs", None),
        ]);
        self.request(Method::POST, &path, ResponseFormat::Json)?
            .json(&json!({ "specs": specs }))
            .send()
    }

    /// get /api/assignments/{assignment_id}/test_files
    /// Returns a zip file of the files used for automated testing.
    pub fn get_test_files(&self, assignment_id: u64) -> MarkusClientResult<ApiResponse> {
        let path = resource_path([("assignments", Some(assignment_id)), ("test_files", None)]);
        self.request(Method::GET, &path, ResponseFormat::Content)?
            .send()
    }
}

/// Starter files.
impl MarkusClient {
    /// get /api/assignments/{assignment_id}/starter_file_groups
    pub fn get_starter_file_groups(&self, assignment_id: u64) -> MarkusClientResult<ApiResponse> {
        let path = resource_path([
            ("assignments", Some(assignment_id)),
            ("starter_file_groups", None),
        ]);
        self.request(Method::GET, &path, ResponseFormat::Json)?
            .send()
    }

    /// post /api/assignments/{assignment_id}/starter_file_groups
    pub fn create_starter_file_group(&self, assignment_id: u64) -> MarkusClientResult<ApiResponse> {
        let path = resource_path([
            ("assignments", Some(assignment_id)),
            ("starter_file_groups", None),
        ]);
        self.request(Method::POST, &path, ResponseFormat::Json)?
            .send()
    }

    /// get /api/assignments/{assignment_id}/starter_file_groups/{starter_file_group_id}
    pub fn get_starter_file_group(
        &self,
        assignment_id: u64,
        starter_file_group_id: u64,
    ) -> MarkusClientResult<ApiResponse> {
        let path = starter_file_group_path(assignment_id, starter_file_group_id, &[]);
        self.request(Method::GET, &path, ResponseFormat::Json)?
            .send()
    }

    /// put /api/assignments/{assignment_id}/starter_file_groups/{starter_file_group_id}
    pub fn update_starter_file_group(
        &self,
        assignment_id: u64,
        starter_file_group_id: u64,
        update: &StarterFileGroupUpdate,
    ) -> MarkusClientResult<ApiResponse> {
        let path = starter_file_group_path(assignment_id, starter_file_group_id, &[]);
        let params = Params::from_serialize(update)?;
        self.request(Method::PUT, &path, ResponseFormat::Json)?
            .query(&params)
            .send()
    }

    /// delete /api/assignments/{assignment_id}/starter_file_groups/{starter_file_group_id}
    pub fn delete_starter_file_group(
        &self,
        assignment_id: u64,
        starter_file_group_id: u64,
    ) -> MarkusClientResult<ApiResponse> {
        let path = starter_file_group_path(assignment_id, starter_file_group_id, &[]);
        self.request(Method::DELETE, &path, ResponseFormat::Json)?
            .send()
    }

    /// get /api/assignments/{assignment_id}/starter_file_groups/{starter_file_group_id}/entries
    /// Returns the names of the files and directories in the group.
    pub fn get_starter_file_entries(
        &self,
        assignment_id: u64,
        starter_file_group_id: u64,
    ) -> MarkusClientResult<ApiResponse> {
        let path =
            starter_file_group_path(assignment_id, starter_file_group_id, &[("entries", None)]);
        self.request(Method::GET, &path, ResponseFormat::Json)?
            .send()
    }

    /// post /api/assignments/{assignment_id}/starter_file_groups/{starter_file_group_id}/create_file
    /// `file_path` is relative to the root directory of the starter file group.
    pub fn create_starter_file(
        &self,
        assignment_id: u64,
        starter_file_group_id: u64,
        file_path: &str,
        contents: impl Into<Vec<u8>>,
    ) -> MarkusClientResult<ApiResponse> {
        let path = starter_file_group_path(
            assignment_id,
            starter_file_group_id,
            &[("create_file", None)],
        );
        let mut params = Params::new();
        params.push("filename", file_path);
        self.request(Method::POST, &path, ResponseFormat::Json)?
            .query(&params)
            .multipart(file_content_form(file_path, contents.into()))
            .send()
    }

    /// post /api/assignments/{assignment_id}/starter_file_groups/{starter_file_group_id}/create_folder
    pub fn create_starter_folder(
        &self,
        assignment_id: u64,
        starter_file_group_id: u64,
        folder_path: &str,
    ) -> MarkusClientResult<ApiResponse> {
        let path = starter_file_group_path(
            assignment_id,
            starter_file_group_id,
            &[("create_folder", None)],
        );
        let mut params = Params::new();
        params.push("folder_path", folder_path);
        self.request(Method::POST, &path, ResponseFormat::Json)?
            .query(&params)
            .send()
    }

    /// delete /api/assignments/{assignment_id}/starter_file_groups/{starter_file_group_id}/remove_file
    pub fn remove_starter_file(
        &self,
        assignment_id: u64,
        starter_file_group_id: u64,
        file_path: &str,
    ) -> MarkusClientResult<ApiResponse> {
        let path = starter_file_group_path(
            assignment_id,
            starter_file_group_id,
            &[("remove_file", None)],
        );
        let mut params = Params::new();
        params.push("filename", file_path);
        self.request(Method::DELETE, &path, ResponseFormat::Json)?
            .query(&params)
            .send()
    }

    /// delete /api/assignments/{assignment_id}/starter_file_groups/{starter_file_group_id}/remove_folder
    pub fn remove_starter_folder(
        &self,
        assignment_id: u64,
        starter_file_group_id: u64,
        folder_path: &str,
    ) -> MarkusClientResult<ApiResponse> {
        let path = starter_file_group_path(
            assignment_id,
            starter_file_group_id,
            &[("remove_folder", None)],
        );
        let mut params = Params::new();
        params.push("folder_path", folder_path);
        self.request(Method::DELETE, &path, ResponseFormat::Json)?
            .query(&params)
            .send()
    }

    /// get /api/assignments/{assignment_id}/starter_file_groups/{starter_file_group_id}/download_entries
    /// Returns a zip file of every starter file in the group.
    pub fn download_starter_file_entries(
        &self,
        assignment_id: u64,
        starter_file_group_id: u64,
    ) -> MarkusClientResult<ApiResponse> {
        let path = starter_file_group_path(
            assignment_id,
            starter_file_group_id,
            &[("download_entries", None)],
        );
        self.request(Method::GET, &path, ResponseFormat::Content)?
            .send()
    }
}
