mod file_job_repository_test;
