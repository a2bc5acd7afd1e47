mod submission_category;
mod submission_record;
mod submitter_name;
mod subscriber_email;
mod subscriber_record;

pub use submission_category::SubmissionCategory;
pub use submission_record::SubmissionRecord;
pub use submitter_name::SubmitterName;
pub use subscriber_email::SubscriberEmail;
pub use subscriber_record::SubscriberRecord;
